//! 试卷导出服务 - 业务能力层
//!
//! 把组好的试卷排成文本行，分页写入 A4 PDF

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tokio::fs;
use tracing::info;

use crate::config::Config;
use crate::error::{AppResult, ExportError};
use crate::models::{to_plain_text, GeneratedPaper};

/// A4，单位 pt
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 11;
const LINE_HEIGHT: i64 = 14;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize;
const WRAP_WIDTH: usize = 88;

/// 空试卷时的提示
pub const EMPTY_PAPER_NOTICE: &str = "Not enough questions in bank!";

/// PDF 导出器
#[derive(Debug, Clone)]
pub struct PdfExporter {
    school_name: String,
    exam_duration: String,
}

impl PdfExporter {
    pub fn new(school_name: impl Into<String>, exam_duration: impl Into<String>) -> Self {
        Self {
            school_name: school_name.into(),
            exam_duration: exam_duration.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.school_name.clone(), config.exam_duration.clone())
    }

    /// 默认文件名：`<科目>_Paper_<日期>.pdf`
    pub fn default_file_name(subject: &str, date: NaiveDate) -> String {
        let subject: String = subject
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_Paper_{}.pdf", subject, date.format("%Y-%m-%d"))
    }

    /// 试卷排版后的文本行
    pub fn render_lines(&self, paper: &GeneratedPaper) -> Vec<String> {
        let mut lines = vec![
            self.school_name.clone(),
            format!("{} - EXAMINATION", paper.blueprint.subject.to_uppercase()),
            format!(
                "Time: {}    Max Marks: {}",
                self.exam_duration,
                paper.achieved_marks()
            ),
            "-".repeat(WRAP_WIDTH),
            String::new(),
        ];

        if paper.is_empty() {
            lines.push(EMPTY_PAPER_NOTICE.to_string());
            return lines;
        }

        for (index, question) in paper.questions.iter().enumerate() {
            let body = format!(
                "Q{}. {} [{}]",
                index + 1,
                to_plain_text(&question.text),
                question.marks
            );
            lines.extend(wrap(&body, WRAP_WIDTH));
            lines.push(String::new());
        }
        lines
    }

    /// 生成 PDF 字节
    pub fn render_pdf(&self, paper: &GeneratedPaper) -> AppResult<Vec<u8>> {
        let lines = self.render_lines(paper);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut page_ids: Vec<ObjectId> = Vec::new();
        for chunk in lines.chunks(LINES_PER_PAGE) {
            let content = page_content(chunk);
            let encoded = content
                .encode()
                .map_err(|e| ExportError::RenderFailed(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => Object::Integer(page_ids.len() as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ExportError::RenderFailed(e.to_string()))?;
        Ok(bytes)
    }

    /// 导出到文件，返回写入的路径
    pub async fn export(&self, paper: &GeneratedPaper, path: &Path) -> AppResult<PathBuf> {
        let bytes = self.render_pdf(paper)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ExportError::SaveFailed {
                    path: parent.display().to_string(),
                    source: e,
                })?;
        }
        fs::write(path, &bytes)
            .await
            .map_err(|e| ExportError::SaveFailed {
                path: path.display().to_string(),
                source: e,
            })?;

        info!("🖨️ 试卷已导出: {} ({} 字节)", path.display(), bytes.len());
        Ok(path.to_path_buf())
    }
}

fn page_content(lines: &[String]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), Object::Integer(FONT_SIZE)]),
        Operation::new("TL", vec![Object::Integer(LINE_HEIGHT)]),
        Operation::new(
            "Td",
            vec![Object::Integer(MARGIN), Object::Integer(PAGE_HEIGHT - MARGIN)],
        ),
    ];
    for line in lines {
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_latin1(line))],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Helvetica 只覆盖 Latin-1，其余字符替换为 `?`
fn to_latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// 按单词折行，超长单词强制截断，续行缩进四格
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: String = word.to_string();
        loop {
            let has_content = !current.trim().is_empty();
            let current_len = current.chars().count();
            let separator = usize::from(has_content);
            if current_len + separator + word.chars().count() <= width {
                if has_content {
                    current.push(' ');
                }
                current.push_str(&word);
                break;
            }
            if has_content {
                lines.push(std::mem::replace(&mut current, "    ".to_string()));
                continue;
            }
            // 单词本身比一行还长
            let room = width.saturating_sub(current_len).max(1);
            let head: String = word.chars().take(room).collect();
            word = word.chars().skip(room).collect();
            current.push_str(&head);
            lines.push(std::mem::replace(&mut current, "    ".to_string()));
            if word.is_empty() {
                break;
            }
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Blueprint, Difficulty, Question, QuestionType};

    fn question(text: &str, marks: u32) -> Question {
        Question {
            id: Some(format!("id-{}", marks)),
            text: text.to_string(),
            subject: "Physics".to_string(),
            chapter: "Optics".to_string(),
            marks,
            question_type: QuestionType::Long,
            difficulty: Difficulty::Easy,
            user_id: "u1".to_string(),
            created_at: None,
        }
    }

    fn paper(questions: Vec<Question>) -> GeneratedPaper {
        GeneratedPaper::new(Blueprint::new("Physics", 20).unwrap(), questions)
    }

    fn exporter() -> PdfExporter {
        PdfExporter::new("CARMEL SCHOOL, KARGALI", "1 Hr")
    }

    #[test]
    fn lines_contain_header_and_numbered_questions() {
        let lines = exporter().render_lines(&paper(vec![
            question("Find $x^2$ now", 5),
            question("State Snell's law", 3),
        ]));

        assert_eq!(lines[0], "CARMEL SCHOOL, KARGALI");
        assert_eq!(lines[1], "PHYSICS - EXAMINATION");
        assert!(lines[2].contains("Max Marks: 8"));
        assert!(lines.contains(&"Q1. Find x^2 now [5]".to_string()));
        assert!(lines.contains(&"Q2. State Snell's law [3]".to_string()));
    }

    #[test]
    fn empty_paper_shows_notice() {
        let lines = exporter().render_lines(&paper(Vec::new()));
        assert_eq!(lines.last().map(String::as_str), Some(EMPTY_PAPER_NOTICE));
    }

    #[test]
    fn pdf_pages_grow_with_content() {
        let short = exporter().render_pdf(&paper(vec![question("Short", 1)])).unwrap();
        let doc = Document::load_mem(&short).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let long_text = "word ".repeat(400);
        let many: Vec<Question> = (1..=5).map(|m| question(&long_text, m)).collect();
        let long = exporter().render_pdf(&paper(many)).unwrap();
        let doc = Document::load_mem(&long).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn wrap_respects_width() {
        let text = format!("Q1. {} {}", "alpha ".repeat(30), "x".repeat(200));
        for line in wrap(&text, 40) {
            assert!(line.chars().count() <= 40, "过长: {:?}", line);
        }
    }

    #[test]
    fn file_name_uses_subject_and_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            PdfExporter::default_file_name("Physics", date),
            "Physics_Paper_2025-03-01.pdf"
        );
        assert_eq!(
            PdfExporter::default_file_name("Social Science", date),
            "Social_Science_Paper_2025-03-01.pdf"
        );
    }

    #[tokio::test]
    async fn export_writes_file_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("paper.pdf");
        let written = exporter()
            .export(&paper(vec![question("Short", 2)]), &path)
            .await
            .unwrap();
        assert_eq!(written, path);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
