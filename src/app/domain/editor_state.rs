use super::blocks::{BlockKind, ElementFormat};
use super::document::{Block, DocumentModel, TextRun};
use super::marks::TextMark;
use super::selection::{RangeSelection, Selection};

/// Immutable snapshot handed to update listeners: the document plus the
/// current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorState {
    pub document: DocumentModel,
    pub selection: Option<Selection>,
}

impl EditorState {
    pub fn new(document: DocumentModel) -> Self {
        Self {
            document,
            selection: None,
        }
    }

    pub fn range_selection(&self) -> Option<&RangeSelection> {
        self.selection.as_ref().and_then(Selection::as_range)
    }

    /// Top-level block containing the range anchor. `None` means the anchor
    /// sits on the root itself (an empty document).
    pub fn anchor_block(&self) -> Option<&Block> {
        let range = self.range_selection()?;
        self.document.block(range.anchor.block)
    }

    /// Kind and alignment of the anchor block, with root defaults.
    pub fn anchor_element(&self) -> (BlockKind, ElementFormat, u32) {
        match self.anchor_block() {
            Some(block) => (block.kind, block.align, block.indent),
            None => (BlockKind::Paragraph, ElementFormat::Left, 0),
        }
    }

    /// Non-empty runs covered by a non-collapsed range.
    pub fn selected_runs(&self, range: &RangeSelection) -> Vec<&TextRun> {
        let (start, end) = (range.start(), range.end());
        let mut out = Vec::new();
        for b in start.block..=end.block {
            let Some(block) = self.document.block(b) else { break };
            let from = if b == start.block { start.offset } else { 0 };
            let to = if b == end.block { end.offset } else { block.char_len() };
            out.extend(block.runs_overlapping(from, to));
        }
        out
    }

    /// Whether the selection carries `mark`. A caret reports its own
    /// format; a range reports true only when every selected run has it.
    pub fn selection_has_mark(&self, mark: TextMark) -> bool {
        let Some(range) = self.range_selection() else {
            return false;
        };
        if range.is_collapsed() {
            return range.format.contains(mark);
        }
        let runs = self.selected_runs(range);
        if runs.is_empty() {
            return range.format.contains(mark);
        }
        runs.iter().all(|r| r.marks.contains(mark))
    }

    /// Value of a style property across the selection. Runs without the
    /// property count as `default`; differing values give an empty string.
    pub fn selection_style_value(&self, key: &str, default: &str) -> String {
        let Some(range) = self.range_selection() else {
            return default.to_string();
        };
        let caret_value = || range.style.get(key).unwrap_or(default).to_string();
        if range.is_collapsed() {
            return caret_value();
        }
        let runs = self.selected_runs(range);
        let mut values = runs.iter().map(|r| r.style.get(key).unwrap_or(default));
        match values.next() {
            None => caret_value(),
            Some(first) if values.all(|v| v == first) => first.to_string(),
            Some(_) => String::new(),
        }
    }

    pub fn selected_text(&self) -> String {
        match &self.selection {
            Some(Selection::Range(range)) => self.document.text_between(range.start(), range.end()),
            Some(Selection::Node(node)) => self
                .document
                .block(node.block)
                .map(Block::text)
                .unwrap_or_default(),
            None => String::new(),
        }
    }
}
