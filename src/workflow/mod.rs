pub mod paper_flow;
pub mod session;

pub use paper_flow::PaperFlow;
pub use session::Session;
