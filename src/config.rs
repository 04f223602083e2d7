use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 题库数据目录（JSON 文档存储）
    pub data_dir: String,
    /// 导出 PDF 的默认目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 生成试卷时默认总分
    pub default_total_marks: u32,
    // --- 试卷版式 ---
    pub school_name: String,
    pub exam_duration: String,
    // --- 本地身份 ---
    pub local_user_id: Option<String>,
    pub local_user_name: String,
    pub local_user_email: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "question_bank".to_string(),
            output_dir: "output_pdf".to_string(),
            verbose_logging: false,
            default_total_marks: 20,
            school_name: "CARMEL SCHOOL, KARGALI".to_string(),
            exam_duration: "1 Hr".to_string(),
            local_user_id: None,
            local_user_name: "Teacher".to_string(),
            local_user_email: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or(default.data_dir),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            default_total_marks: std::env::var("DEFAULT_TOTAL_MARKS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_total_marks),
            school_name: std::env::var("SCHOOL_NAME").unwrap_or(default.school_name),
            exam_duration: std::env::var("EXAM_DURATION").unwrap_or(default.exam_duration),
            local_user_id: std::env::var("LOCAL_USER_ID").ok().filter(|v| !v.trim().is_empty()),
            local_user_name: std::env::var("LOCAL_USER_NAME").unwrap_or(default.local_user_name),
            local_user_email: std::env::var("LOCAL_USER_EMAIL").unwrap_or(default.local_user_email),
        }
    }

    /// 校验配置，总分为 0 时无法生成试卷
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_total_marks == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "DEFAULT_TOTAL_MARKS".to_string(),
                value: self.default_total_marks.to_string(),
                expected_type: "正整数".to_string(),
            });
        }
        Ok(())
    }
}
