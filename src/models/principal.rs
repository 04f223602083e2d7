use serde::{Deserialize, Serialize};

/// 当前登录用户
///
/// 所有题库操作都显式接收 `&Principal`，不依赖全局会话状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

impl Principal {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.email.is_empty() {
            write!(f, "{} ({})", self.display_name, self.id)
        } else {
            write!(f, "{} <{}> ({})", self.display_name, self.email, self.id)
        }
    }
}
