use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 身份认证错误
    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),
    /// 文档存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 试卷导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输入参数不合法
    #[error("参数错误 ({field}): {reason}")]
    InvalidInput { field: String, reason: String },
    /// 无权操作他人的题目
    #[error("无权操作题目 {id}")]
    Forbidden { id: String },
}

/// 身份认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 未登录
    #[error("当前没有登录用户")]
    NotSignedIn,
    /// 身份提供方拒绝登录
    #[error("登录失败: {reason}")]
    SignInRejected { reason: String },
}

/// 文档存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取失败
    #[error("读取集合 {collection} 失败: {source}")]
    ReadFailed {
        collection: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入失败
    #[error("写入集合 {collection} 失败: {source}")]
    WriteFailed {
        collection: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文档不存在
    #[error("文档不存在: {collection}/{id}")]
    NotFound { collection: String, id: String },
    /// 文档结构不合法（无法转换为题目）
    #[error("文档 {id} 格式不合法: {reason}")]
    MalformedDocument { id: String, reason: String },
}

/// 试卷导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// PDF 渲染失败
    #[error("PDF 渲染失败: {0}")]
    RenderFailed(String),
    /// 保存文件失败
    #[error("保存 PDF 失败 ({path}): {source}")]
    SaveFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建参数错误
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 创建存储读取错误
    pub fn store_read_failed(
        collection: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Store(StoreError::ReadFailed {
            collection: collection.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储写入错误
    pub fn store_write_failed(
        collection: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Store(StoreError::WriteFailed {
            collection: collection.into(),
            source: Box::new(source),
        })
    }

    /// 是否为参数错误
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AppError::InvalidInput { .. })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
