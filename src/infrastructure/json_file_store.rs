use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, StoreError};
use crate::infrastructure::document_store::{
    apply_query, merge_update, stamp_new_document, Document, DocumentStore, Filter, OrderBy,
};

/// 基于本地目录的 JSON 文档存储
///
/// 目录结构：`<root>/<collection>/<id>.json`，每个文件一条文档。
pub struct JsonFileStore {
    root: PathBuf,
    /// 串行化读-改-写
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> AppResult<PathBuf> {
        if !is_safe_name(collection) {
            return Err(AppError::invalid_input("collection", format!("非法集合名: {}", collection)));
        }
        Ok(self.root.join(collection))
    }

    /// 非法 id 不可能对应任何文档
    fn document_path(&self, collection: &str, id: &str) -> AppResult<Option<PathBuf>> {
        let dir = self.collection_dir(collection)?;
        if !is_safe_name(id) {
            return Ok(None);
        }
        Ok(Some(dir.join(format!("{}.json", id))))
    }

    async fn read_file(&self, collection: &str, path: &Path) -> AppResult<Option<Document>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::store_read_failed(collection, e)),
        };

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| AppError::store_read_failed(collection, e))?;

        match value {
            Value::Object(doc) => Ok(Some(doc)),
            _ => Err(StoreError::MalformedDocument {
                id: path.display().to_string(),
                reason: "文档不是 JSON 对象".to_string(),
            }
            .into()),
        }
    }

    async fn write_file(&self, collection: &str, path: &Path, doc: &Document) -> AppResult<()> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| AppError::store_write_failed(collection, e))?;
        fs::write(path, content)
            .await
            .map_err(|e| AppError::store_write_failed(collection, e))
    }

    fn not_found(collection: &str, id: &str) -> AppError {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
        .into()
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl DocumentStore for JsonFileStore {
    async fn create(&self, collection: &str, record: Document) -> AppResult<String> {
        let dir = self.collection_dir(collection)?;
        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::store_write_failed(collection, e))?;

        let (id, doc) = stamp_new_document(record);
        let path = dir.join(format!("{}.json", id));
        self.write_file(collection, &path, &doc).await?;

        debug!("[文件存储] 新建 {}", path.display());
        Ok(id)
    }

    async fn read(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        match self.document_path(collection, id)? {
            Some(path) => self.read_file(collection, &path).await,
            None => Ok(None),
        }
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> AppResult<()> {
        let path = self
            .document_path(collection, id)?
            .ok_or_else(|| Self::not_found(collection, id))?;
        let _guard = self.write_lock.lock().await;

        let mut existing = self
            .read_file(collection, &path)
            .await?
            .ok_or_else(|| Self::not_found(collection, id))?;
        merge_update(&mut existing, partial);
        self.write_file(collection, &path, &existing).await
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let path = self
            .document_path(collection, id)?
            .ok_or_else(|| Self::not_found(collection, id))?;
        let _guard = self.write_lock.lock().await;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("[文件存储] 删除 {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(collection, id)),
            Err(e) => Err(AppError::store_write_failed(collection, e)),
        }
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        ordering: Option<&OrderBy>,
    ) -> AppResult<Vec<Document>> {
        let dir = self.collection_dir(collection)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::store_read_failed(collection, e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::store_read_failed(collection, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        // UUID v7 文件名按时间有序
        paths.sort();

        let mut docs = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read_file(collection, &path).await {
                Ok(Some(doc)) => docs.push(doc),
                Ok(None) => {}
                Err(e) => warn!("[文件存储] 跳过无法读取的文档 {}: {}", path.display(), e),
            }
        }

        Ok(apply_query(docs, filters, ordering))
    }
}
