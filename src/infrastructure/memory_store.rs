use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{AppResult, StoreError};
use crate::infrastructure::document_store::{
    apply_query, merge_update, stamp_new_document, Document, DocumentStore, Filter, OrderBy,
};

/// 内存文档存储
///
/// 测试和一次性会话使用；按插入顺序打破排序字段相同的情况。
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

#[derive(Debug, Default)]
struct Collection {
    next_seq: u64,
    docs: HashMap<String, (u64, Document)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 集合中的文档数量
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.docs.len())
            .unwrap_or(0)
    }
}

impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, record: Document) -> AppResult<String> {
        let (id, doc) = stamp_new_document(record);
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        let seq = entry.next_seq;
        entry.next_seq += 1;
        entry.docs.insert(id.clone(), (seq, doc));
        debug!("[内存存储] 新建 {}/{}", collection, id);
        Ok(id)
    }

    async fn read(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.docs.get(id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let (_, existing) = collections
            .get_mut(collection)
            .and_then(|c| c.docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_update(existing, partial);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|c| c.docs.remove(id));
        if removed.is_none() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }
            .into());
        }
        debug!("[内存存储] 删除 {}/{}", collection, id);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        ordering: Option<&OrderBy>,
    ) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(entry) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut docs: Vec<&(u64, Document)> = entry.docs.values().collect();
        docs.sort_by_key(|(seq, _)| *seq);
        let docs = docs.into_iter().map(|(_, doc)| doc.clone()).collect();

        Ok(apply_query(docs, filters, ordering))
    }
}
