//! 题库服务 - 业务能力层
//!
//! 负责单个用户题库的增删改查，所有操作都显式接收当前用户。
//! 存储层返回的文档在这里转换为 `Question`，之后的代码只信任转换结果。

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, StoreError};
use crate::infrastructure::{Document, DocumentStore, Filter, OrderBy};
use crate::models::{Principal, Question, QuestionDraft, QuestionPatch};
use crate::utils::logging::truncate_text;

/// 题目集合名
pub const QUESTIONS_COLLECTION: &str = "questions";

/// 批量导入统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub created: usize,
    pub invalid: usize,
}

/// 题库服务
pub struct QuestionService<S> {
    store: Arc<S>,
}

impl<S> Clone for QuestionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> QuestionService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 新建题目
    ///
    /// `userId` 取自 `principal`，`id` / `createdAt` 由存储层分配。
    pub async fn create(&self, principal: &Principal, draft: &QuestionDraft) -> AppResult<Question> {
        draft.validate()?;

        let id = self
            .store
            .create(QUESTIONS_COLLECTION, draft.to_document(&principal.id))
            .await?;
        info!(
            "[{}] ✓ 新建题目 {}: {}",
            principal.id,
            id,
            truncate_text(&draft.text, 40)
        );

        self.load(&id)
            .await?
            .ok_or_else(|| {
                AppError::store_read_failed(QUESTIONS_COLLECTION, missing_after_write(&id))
            })
    }

    /// 读取题目，不存在时返回 `None`
    ///
    /// 先校验归属再转换，他人的文档无论格式是否合法都返回 `Forbidden`
    pub async fn get(&self, principal: &Principal, id: &str) -> AppResult<Option<Question>> {
        match self.store.read(QUESTIONS_COLLECTION, id).await? {
            Some(doc) => {
                ensure_owner(principal, id, &doc)?;
                Ok(Some(Question::from_document(&doc)?))
            }
            None => Ok(None),
        }
    }

    /// 编辑题目，`id` / `userId` / `createdAt` 保持不变
    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        patch: &QuestionPatch,
    ) -> AppResult<Question> {
        patch.validate()?;
        self.require_owned(principal, id).await?;

        self.store
            .update(QUESTIONS_COLLECTION, id, patch.to_document())
            .await?;
        info!("[{}] ✓ 更新题目 {}", principal.id, id);

        self.load(id)
            .await?
            .ok_or_else(|| {
                AppError::store_read_failed(QUESTIONS_COLLECTION, missing_after_write(id))
            })
    }

    /// 删除题目
    ///
    /// 只校验归属，格式不合法的文档同样可以删除
    pub async fn delete(&self, principal: &Principal, id: &str) -> AppResult<()> {
        self.require_owned(principal, id).await?;
        self.store.delete(QUESTIONS_COLLECTION, id).await?;
        info!("[{}] 🗑️ 删除题目 {}", principal.id, id);
        Ok(())
    }

    /// 当前用户的全部题目，最新的在前
    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<Question>> {
        self.query(vec![Filter::equals("userId", principal.id.as_str())])
            .await
    }

    /// 当前用户某一科目的题目（组卷题池），最新的在前
    pub async fn list_by_subject(
        &self,
        principal: &Principal,
        subject: &str,
    ) -> AppResult<Vec<Question>> {
        self.query(vec![
            Filter::equals("userId", principal.id.as_str()),
            Filter::equals("subject", subject),
        ])
        .await
    }

    /// 批量导入，不合法的草稿计数后跳过
    pub async fn import_drafts(
        &self,
        principal: &Principal,
        drafts: &[QuestionDraft],
    ) -> AppResult<ImportStats> {
        let mut stats = ImportStats::default();
        for (index, draft) in drafts.iter().enumerate() {
            match self.create(principal, draft).await {
                Ok(_) => stats.created += 1,
                Err(e) if e.is_invalid_input() => {
                    warn!("[{}] ⚠️ 第 {} 题不合法，已跳过: {}", principal.id, index + 1, e);
                    stats.invalid += 1;
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            "[{}] 导入完成: 新建 {} 题，跳过 {} 题",
            principal.id, stats.created, stats.invalid
        );
        Ok(stats)
    }

    async fn query(&self, filters: Vec<Filter>) -> AppResult<Vec<Question>> {
        let docs = self
            .store
            .query(QUESTIONS_COLLECTION, &filters, Some(&OrderBy::desc("createdAt")))
            .await?;
        let total = docs.len();
        let questions: Vec<Question> = docs.iter().filter_map(quarantine_malformed).collect();

        if questions.len() < total {
            warn!("⚠️ {} 条文档格式不合法，已隔离", total - questions.len());
        }
        debug!("查询到 {} 道题目", questions.len());
        Ok(questions)
    }

    async fn load(&self, id: &str) -> AppResult<Option<Question>> {
        match self.store.read(QUESTIONS_COLLECTION, id).await? {
            Some(doc) => Ok(Some(Question::from_document(&doc)?)),
            None => Ok(None),
        }
    }

    /// 读取原始文档并校验归属，不做题目转换
    async fn require_owned(&self, principal: &Principal, id: &str) -> AppResult<Document> {
        let doc = self
            .store
            .read(QUESTIONS_COLLECTION, id)
            .await?
            .ok_or_else(|| {
                AppError::Store(StoreError::NotFound {
                    collection: QUESTIONS_COLLECTION.to_string(),
                    id: id.to_string(),
                })
            })?;
        ensure_owner(principal, id, &doc)?;
        Ok(doc)
    }
}

fn ensure_owner(principal: &Principal, id: &str, doc: &Document) -> AppResult<()> {
    if doc.get("userId").and_then(Value::as_str) != Some(principal.id.as_str()) {
        return Err(AppError::Forbidden { id: id.to_string() });
    }
    Ok(())
}

/// 列表查询中跳过不合法的文档
fn quarantine_malformed(doc: &Document) -> Option<Question> {
    match Question::from_document(doc) {
        Ok(question) => Some(question),
        Err(e) => {
            let id = doc.get("id").and_then(Value::as_str).unwrap_or("<无ID>");
            warn!("[存储边界] 隔离文档 {}: {}", id, e);
            None
        }
    }
}

fn missing_after_write(id: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("写入后无法读回文档 {}", id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use crate::models::{Difficulty, QuestionType};
    use serde_json::json;

    fn owner() -> Principal {
        Principal::new("t1", "Asha", "asha@example.com")
    }

    fn stranger() -> Principal {
        Principal::new("t2", "Ravi", "ravi@example.com")
    }

    fn draft(subject: &str, marks: u32) -> QuestionDraft {
        QuestionDraft {
            subject: subject.to_string(),
            chapter: "Kinematics".to_string(),
            text: "Find $v$ when $a = 2$".to_string(),
            marks,
            question_type: QuestionType::Long,
            difficulty: Difficulty::Hard,
        }
    }

    fn service() -> (Arc<MemoryStore>, QuestionService<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), QuestionService::new(store))
    }

    #[tokio::test]
    async fn create_assigns_store_fields_and_owner() {
        let (_, svc) = service();
        let q = svc.create(&owner(), &draft("Physics", 3)).await.unwrap();
        assert!(q.id.is_some());
        assert!(q.created_at.is_some());
        assert_eq!(q.user_id, "t1");
        assert_eq!(q.marks, 3);
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft() {
        let (store, svc) = service();
        let err = svc.create(&owner(), &draft("Physics", 9)).await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.len(QUESTIONS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn update_never_touches_identity_fields() {
        let (_, svc) = service();
        let original = svc.create(&owner(), &draft("Physics", 3)).await.unwrap();
        let id = original.id.clone().unwrap();

        let patch = QuestionPatch {
            text: Some("Updated $x$".to_string()),
            marks: Some(5),
            ..Default::default()
        };
        let updated = svc.update(&owner(), &id, &patch).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.user_id, original.user_id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.text, "Updated $x$");
        assert_eq!(updated.marks, 5);
        assert_eq!(updated.chapter, original.chapter);
    }

    #[tokio::test]
    async fn delete_makes_read_return_none() {
        let (_, svc) = service();
        let q = svc.create(&owner(), &draft("Physics", 3)).await.unwrap();
        let id = q.id.unwrap();

        svc.delete(&owner(), &id).await.unwrap();
        assert!(svc.get(&owner(), &id).await.unwrap().is_none());

        let err = svc.delete(&owner(), &id).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_question() {
        let (_, svc) = service();
        let q = svc.create(&owner(), &draft("Physics", 3)).await.unwrap();
        let id = q.id.unwrap();

        assert!(matches!(
            svc.get(&stranger(), &id).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        let patch = QuestionPatch {
            marks: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(&stranger(), &id, &patch).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert!(matches!(
            svc.delete(&stranger(), &id).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert!(svc.get(&owner(), &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn lists_are_scoped_and_newest_first() {
        let (_, svc) = service();
        let first = svc.create(&owner(), &draft("Physics", 1)).await.unwrap();
        let second = svc.create(&owner(), &draft("Maths", 2)).await.unwrap();
        let third = svc.create(&owner(), &draft("Physics", 3)).await.unwrap();
        svc.create(&stranger(), &draft("Physics", 4)).await.unwrap();

        let all = svc.list(&owner()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids, vec![third.id.clone(), second.id, first.id.clone()]);

        let physics = svc.list_by_subject(&owner(), "Physics").await.unwrap();
        let ids: Vec<_> = physics.iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids, vec![third.id, first.id]);
    }

    #[tokio::test]
    async fn malformed_documents_are_quarantined_in_lists() {
        let (store, svc) = service();
        svc.create(&owner(), &draft("Physics", 2)).await.unwrap();

        let bad = json!({
            "text": "broken", "subject": "Physics", "chapter": "x",
            "marks": -1, "type": "MCQ", "difficulty": "Easy", "userId": "t1"
        });
        let bad_id = store
            .create(QUESTIONS_COLLECTION, bad.as_object().cloned().unwrap())
            .await
            .unwrap();

        let pool = svc.list_by_subject(&owner(), "Physics").await.unwrap();
        assert_eq!(pool.len(), 1);

        let err = svc.get(&owner(), &bad_id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Store(StoreError::MalformedDocument { .. })
        ));
    }

    async fn insert_malformed(store: &MemoryStore, user_id: &str) -> String {
        let bad = json!({
            "text": "broken", "subject": "Physics", "chapter": "x",
            "marks": -1, "type": "MCQ", "difficulty": "Easy", "userId": user_id
        });
        store
            .create(QUESTIONS_COLLECTION, bad.as_object().cloned().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn owner_can_delete_a_malformed_document() {
        let (store, svc) = service();
        let bad_id = insert_malformed(&store, "t1").await;

        svc.delete(&owner(), &bad_id).await.unwrap();
        assert_eq!(store.len(QUESTIONS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn malformed_documents_of_others_stay_forbidden() {
        let (store, svc) = service();
        let bad_id = insert_malformed(&store, "t1").await;

        assert!(matches!(
            svc.get(&stranger(), &bad_id).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert!(matches!(
            svc.delete(&stranger(), &bad_id).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert_eq!(store.len(QUESTIONS_COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn import_counts_invalid_drafts() {
        let (_, svc) = service();
        let drafts = vec![draft("Physics", 1), draft("Physics", 0), draft("", 2)];
        let stats = svc.import_drafts(&owner(), &drafts).await.unwrap();
        assert_eq!(stats, ImportStats { created: 1, invalid: 2 });
        assert_eq!(svc.list(&owner()).await.unwrap().len(), 1);
    }
}
