//! 文档存储能力 - 基础设施层
//!
//! 只暴露 create / read / update / delete / query 五种能力，
//! 不认识 `Question`，题目的校验在服务层的存储边界完成。

use std::cmp::Ordering;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppResult;

/// 存储中的一条记录（JSON 对象）
pub type Document = Map<String, Value>;

/// 由存储层赋值、客户端不可修改的字段
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";

/// 等值过滤条件
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// 排序字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// 文档存储
///
/// `create` 时由存储层分配 `id` 和 `createdAt`；`update` 忽略对这两个字段的修改。
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn create(&self, collection: &str, record: Document) -> AppResult<String>;

    async fn read(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    async fn update(&self, collection: &str, id: &str, partial: Document) -> AppResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()>;

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        ordering: Option<&OrderBy>,
    ) -> AppResult<Vec<Document>>;
}

/// 为新文档分配 `id` 和 `createdAt`，覆盖客户端传入的同名字段
pub(crate) fn stamp_new_document(mut record: Document) -> (String, Document) {
    let id = Uuid::now_v7().to_string();
    record.insert(ID_FIELD.to_string(), Value::from(id.clone()));
    record.insert(
        CREATED_AT_FIELD.to_string(),
        Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    (id, record)
}

/// 把局部修改合并进已有文档，`id` / `createdAt` 保持不变
pub(crate) fn merge_update(existing: &mut Document, partial: Document) {
    for (key, value) in partial {
        if key == ID_FIELD || key == CREATED_AT_FIELD {
            debug!("忽略对只读字段 {} 的修改", key);
            continue;
        }
        existing.insert(key, value);
    }
}

/// 过滤并排序
///
/// `docs` 需按创建先后排列；排序字段相同时，降序查询里后创建的在前。
pub(crate) fn apply_query(
    docs: Vec<Document>,
    filters: &[Filter],
    ordering: Option<&OrderBy>,
) -> Vec<Document> {
    let mut matched: Vec<(usize, Document)> = docs
        .into_iter()
        .filter(|doc| filters.iter().all(|f| f.matches(doc)))
        .enumerate()
        .collect();

    if let Some(order) = ordering {
        matched.sort_by(|(ia, a), (ib, b)| {
            compare_values(a.get(&order.field), b.get(&order.field)).then(ia.cmp(ib))
        });
        if order.direction == Direction::Desc {
            matched.reverse();
        }
    }

    matched.into_iter().map(|(_, doc)| doc).collect()
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
