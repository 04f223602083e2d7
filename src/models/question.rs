use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult, StoreError};

/// 作者表单允许的分值范围
pub const MIN_DRAFT_MARKS: u32 = 1;
pub const MAX_DRAFT_MARKS: u32 = 5;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    Short,
    Long,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Short => "Short",
            QuestionType::Long => "Long",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MCQ" => Some(QuestionType::Mcq),
            "Short" => Some(QuestionType::Short),
            "Long" => Some(QuestionType::Long),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Easy" => Some(Difficulty::Easy),
            "Medium" => Some(Difficulty::Medium),
            "Hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 题库中的一道题
///
/// `id` 与 `created_at` 只由存储层赋值，客户端从不设置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub subject: String,
    pub chapter: String,
    pub marks: u32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Question {
    /// 在存储边界把原始文档转换为题目
    ///
    /// 缺字段、未知枚举值、非正分值都视为不合法文档。
    /// `marks` 允许数字字符串（例如 `"5"`），与作者表单的数值转换一致。
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, StoreError> {
        let id = doc.get("id").and_then(Value::as_str).map(str::to_string);
        let doc_id = id.clone().unwrap_or_else(|| "<无ID>".to_string());
        let malformed = |reason: String| StoreError::MalformedDocument {
            id: doc_id.clone(),
            reason,
        };

        let text = required_str(doc, "text").map_err(&malformed)?;
        let subject = required_str(doc, "subject").map_err(&malformed)?;
        let chapter = required_str(doc, "chapter").map_err(&malformed)?;
        let user_id = required_str(doc, "userId").map_err(&malformed)?;
        let marks = coerce_marks(doc.get("marks")).map_err(&malformed)?;

        let type_raw = required_str(doc, "type").map_err(&malformed)?;
        let question_type = QuestionType::parse(&type_raw)
            .ok_or_else(|| malformed(format!("未知题型: {}", type_raw)))?;

        let difficulty_raw = required_str(doc, "difficulty").map_err(&malformed)?;
        let difficulty = Difficulty::parse(&difficulty_raw)
            .ok_or_else(|| malformed(format!("未知难度: {}", difficulty_raw)))?;

        let created_at = match doc.get("createdAt") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| malformed(format!("createdAt 无法解析: {}", e)))?
                    .with_timezone(&Utc),
            ),
            Some(other) => return Err(malformed(format!("createdAt 类型错误: {}", other))),
        };

        Ok(Self {
            id,
            text,
            subject,
            chapter,
            marks,
            question_type,
            difficulty,
            user_id,
            created_at,
        })
    }
}

fn required_str(doc: &Map<String, Value>, field: &str) -> Result<String, String> {
    match doc.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("字段 {} 不是字符串: {}", field, other)),
        None => Err(format!("缺少字段 {}", field)),
    }
}

fn coerce_marks(value: Option<&Value>) -> Result<u32, String> {
    let marks = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| format!("marks 不是非负整数: {}", n))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("marks 无法转换为整数: {:?}", s))?,
        Some(other) => return Err(format!("marks 类型错误: {}", other)),
        None => return Err("缺少字段 marks".to_string()),
    };

    match u32::try_from(marks) {
        Ok(0) => Err("marks 必须为正整数".to_string()),
        Ok(m) => Ok(m),
        Err(_) => Err(format!("marks 超出范围: {}", marks)),
    }
}

/// 作者表单提交的新题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub subject: String,
    pub chapter: String,
    pub text: String,
    pub marks: u32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
}

impl QuestionDraft {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("subject", &self.subject)?;
        require_non_blank("chapter", &self.chapter)?;
        require_non_blank("text", &self.text)?;
        require_draft_marks(self.marks)
    }

    /// 转换为待写入的文档，`userId` 取自当前登录用户
    pub fn to_document(&self, user_id: &str) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("text".into(), Value::from(self.text.clone()));
        doc.insert("subject".into(), Value::from(self.subject.clone()));
        doc.insert("chapter".into(), Value::from(self.chapter.clone()));
        doc.insert("marks".into(), Value::from(self.marks));
        doc.insert("type".into(), Value::from(self.question_type.as_str()));
        doc.insert("difficulty".into(), Value::from(self.difficulty.as_str()));
        doc.insert("userId".into(), Value::from(user_id));
        doc
    }
}

/// 编辑题目时的局部修改
///
/// 没有 `id`、`userId`、`createdAt` 字段，这三者无法通过编辑改变。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionPatch {
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub text: Option<String>,
    pub marks: Option<u32>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub difficulty: Option<Difficulty>,
}

impl QuestionPatch {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.chapter.is_none()
            && self.text.is_none()
            && self.marks.is_none()
            && self.question_type.is_none()
            && self.difficulty.is_none()
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::invalid_input("patch", "没有任何需要修改的字段"));
        }
        if let Some(subject) = &self.subject {
            require_non_blank("subject", subject)?;
        }
        if let Some(chapter) = &self.chapter {
            require_non_blank("chapter", chapter)?;
        }
        if let Some(text) = &self.text {
            require_non_blank("text", text)?;
        }
        if let Some(marks) = self.marks {
            require_draft_marks(marks)?;
        }
        Ok(())
    }

    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        if let Some(text) = &self.text {
            doc.insert("text".into(), Value::from(text.clone()));
        }
        if let Some(subject) = &self.subject {
            doc.insert("subject".into(), Value::from(subject.clone()));
        }
        if let Some(chapter) = &self.chapter {
            doc.insert("chapter".into(), Value::from(chapter.clone()));
        }
        if let Some(marks) = self.marks {
            doc.insert("marks".into(), Value::from(marks));
        }
        if let Some(question_type) = self.question_type {
            doc.insert("type".into(), Value::from(question_type.as_str()));
        }
        if let Some(difficulty) = self.difficulty {
            doc.insert("difficulty".into(), Value::from(difficulty.as_str()));
        }
        doc
    }
}

fn require_non_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input(field, "不能为空"));
    }
    Ok(())
}

fn require_draft_marks(marks: u32) -> AppResult<()> {
    if !(MIN_DRAFT_MARKS..=MAX_DRAFT_MARKS).contains(&marks) {
        return Err(AppError::invalid_input(
            "marks",
            format!("分值必须在 {}-{} 之间，实际为 {}", MIN_DRAFT_MARKS, MAX_DRAFT_MARKS, marks),
        ));
    }
    Ok(())
}
