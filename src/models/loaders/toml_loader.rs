use crate::models::question::QuestionDraft;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 批量导入文件的结构
///
/// ```toml
/// [[questions]]
/// subject = "Physics"
/// chapter = "Motion"
/// text = "Define $v = d/t$"
/// marks = 2
/// type = "Short"
/// difficulty = "Easy"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionImportFile {
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

/// 从 TOML 文件加载待导入的题目
pub async fn load_toml_to_drafts(toml_file_path: &Path) -> Result<Vec<QuestionDraft>> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let file: QuestionImportFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(file.questions)
}

/// 从文件夹中加载所有 TOML 文件里的题目
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<QuestionDraft>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut drafts = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_toml_to_drafts(&path).await {
                Ok(mut loaded) => {
                    tracing::info!("成功加载 {} 个题目", loaded.len());
                    drafts.append(&mut loaded);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(drafts)
}
