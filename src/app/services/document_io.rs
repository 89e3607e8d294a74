//! JSON import/export of the editor document.
//!
//! The on-disk shape is a tree rooted at `root`, with one node per block
//! and one `text` node per run:
//!
//! ```json
//! {"root":{"type":"root","children":[
//!   {"type":"heading","tag":"h1","format":"center","indent":0,
//!    "children":[{"type":"text","text":"Visit","format":1,"style":"color: #f00"}]}
//! ]}}
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::domain::blocks::{BlockKind, ElementFormat, HeadingLevel};
use crate::app::domain::document::{Block, DocumentModel, TextRun};
use crate::app::domain::marks::MarkSet;
use crate::app::domain::style::StyleMap;
use crate::app::infrastructure::error::{AppError, Result};

pub const EXPORT_FILE_NAME: &str = "editor-state.json";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON file.";

#[derive(Debug, Serialize, Deserialize)]
struct SerializedEditorState {
    root: SerializedRoot,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRoot {
    #[serde(rename = "type", default = "root_type")]
    node_type: String,
    #[serde(default)]
    children: Vec<SerializedBlock>,
}

fn root_type() -> String {
    "root".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SerializedBlock {
    Paragraph(SerializedElement),
    Heading(SerializedElement),
    Quote(SerializedElement),
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<HeadingLevel>,
    #[serde(default)]
    format: String,
    #[serde(default)]
    indent: u32,
    #[serde(default)]
    children: Vec<SerializedInline>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SerializedInline {
    Text(SerializedText),
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedText {
    text: String,
    #[serde(default)]
    format: MarkSet,
    #[serde(default)]
    style: StyleMap,
}

fn block_to_serialized(block: &Block) -> SerializedBlock {
    let element = SerializedElement {
        tag: match block.kind {
            BlockKind::Heading(level) => Some(level),
            _ => None,
        },
        format: match block.align {
            ElementFormat::Left => String::new(),
            other => other.as_str().to_string(),
        },
        indent: block.indent,
        children: block
            .runs
            .iter()
            .map(|run| {
                SerializedInline::Text(SerializedText {
                    text: run.text.clone(),
                    format: run.marks,
                    style: run.style.clone(),
                })
            })
            .collect(),
    };
    match block.kind {
        BlockKind::Paragraph => SerializedBlock::Paragraph(element),
        BlockKind::Heading(_) => SerializedBlock::Heading(element),
        BlockKind::Quote => SerializedBlock::Quote(element),
    }
}

fn block_from_serialized(block: SerializedBlock) -> Result<Block> {
    let (kind, element) = match block {
        SerializedBlock::Paragraph(e) => (BlockKind::Paragraph, e),
        SerializedBlock::Quote(e) => (BlockKind::Quote, e),
        SerializedBlock::Heading(e) => {
            let level = e
                .tag
                .ok_or_else(|| AppError::InvalidDocument("heading without tag".to_string()))?;
            (BlockKind::Heading(level), e)
        }
    };
    let align = ElementFormat::parse(&element.format)
        .ok_or_else(|| AppError::InvalidDocument(format!("unknown alignment {:?}", element.format)))?;
    let mut out = Block::new(kind);
    out.align = align;
    out.indent = element.indent;
    out.runs = element
        .children
        .into_iter()
        .map(|SerializedInline::Text(t)| TextRun::styled(t.text, t.format, t.style))
        .collect();
    out.normalize();
    Ok(out)
}

/// Serialize the document as pretty-printed JSON.
pub fn to_json(document: &DocumentModel) -> Result<String> {
    let state = SerializedEditorState {
        root: SerializedRoot {
            node_type: root_type(),
            children: document.blocks.iter().map(block_to_serialized).collect(),
        },
    };
    Ok(serde_json::to_string_pretty(&state)?)
}

/// Parse a serialized document. Syntax errors and schema mismatches are
/// both reported as errors; nothing is partially applied.
pub fn from_json(json: &str) -> Result<DocumentModel> {
    let state: SerializedEditorState = serde_json::from_str(json)?;
    let blocks = state
        .root
        .children
        .into_iter()
        .map(block_from_serialized)
        .collect::<Result<Vec<_>>>()?;
    Ok(DocumentModel::from_blocks(blocks))
}

/// Write `json` to `dir/file_name`, returning the written path.
pub fn write_export(dir: &Path, file_name: &str, json: &str) -> Result<std::path::PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, json)?;
    Ok(path)
}

/// Read an import file as text.
pub fn read_import(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::marks::TextMark;

    fn sample() -> DocumentModel {
        let mut heading = Block::new(BlockKind::Heading(HeadingLevel::H1));
        heading.align = ElementFormat::Center;
        heading.runs.push(TextRun::styled(
            "Discharge summary",
            MarkSet::empty().with(TextMark::Bold),
            StyleMap::parse("color: #1a2b3c; font-size: 24px"),
        ));
        let mut body = Block::paragraph("Patient ");
        body.indent = 2;
        body.runs.push(TextRun::styled(
            "stable",
            MarkSet::empty().with(TextMark::Italic).with(TextMark::Underline),
            StyleMap::parse("background-color: #ff0"),
        ));
        let mut quote = Block::new(BlockKind::Quote);
        quote.align = ElementFormat::Justify;
        quote.runs.push(TextRun::plain("Follow up in two weeks."));
        DocumentModel::from_blocks(vec![heading, body, quote, Block::default()])
    }

    #[test]
    fn test_export_import_preserves_everything() {
        let doc = sample();
        let json = to_json(&doc).unwrap();
        assert_eq!(from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_export_shape() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["root"]["children"][0];
        assert_eq!(value["root"]["type"], "root");
        assert_eq!(first["type"], "heading");
        assert_eq!(first["tag"], "h1");
        assert_eq!(first["format"], "center");
        assert_eq!(first["children"][0]["format"], 1);
        assert_eq!(first["children"][0]["style"], "color: #1a2b3c; font-size: 24px");
        assert_eq!(value["root"]["children"][1]["format"], "");
    }

    #[test]
    fn test_import_tolerates_unknown_fields_and_defaults() {
        let json = r#"{"root":{"children":[
            {"type":"paragraph","direction":"ltr","version":1,
             "children":[{"type":"text","text":"hi","detail":0,"mode":"normal"}]}
        ],"direction":null}}"#;
        let doc = from_json(json).unwrap();
        assert_eq!(doc.plain_text(), "hi");
        assert_eq!(doc.blocks[0].align, ElementFormat::Left);
        assert!(doc.blocks[0].runs[0].style.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(from_json("\"not valid json\""), Err(AppError::Json(_))));
        assert!(matches!(from_json("{ broken"), Err(AppError::Json(_))));
    }

    #[test]
    fn test_schema_mismatch_is_an_error() {
        let unknown_block = r#"{"root":{"children":[{"type":"table","children":[]}]}}"#;
        assert!(from_json(unknown_block).is_err());

        let untagged_heading = r#"{"root":{"children":[{"type":"heading","children":[]}]}}"#;
        assert!(matches!(from_json(untagged_heading), Err(AppError::InvalidDocument(_))));

        let bad_align = r#"{"root":{"children":[{"type":"paragraph","format":"diagonal"}]}}"#;
        assert!(matches!(from_json(bad_align), Err(AppError::InvalidDocument(_))));
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let json = to_json(&sample()).unwrap();
        let path = write_export(dir.path(), EXPORT_FILE_NAME, &json).unwrap();
        assert!(path.ends_with(EXPORT_FILE_NAME));
        let back = read_import(&path).unwrap();
        assert_eq!(from_json(&back).unwrap(), sample());
    }
}
