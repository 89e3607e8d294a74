use super::blocks::{BlockKind, ElementFormat};
use super::marks::MarkSet;
use super::selection::Point;
use super::style::StyleMap;

/// A run of text sharing one set of marks and one inline style.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub marks: MarkSet,
    pub style: StyleMap,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn styled(text: impl Into<String>, marks: MarkSet, style: StyleMap) -> Self {
        Self {
            text: text.into(),
            marks,
            style,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn same_format(&self, other: &TextRun) -> bool {
        self.marks == other.marks && self.style == other.style
    }
}

/// A top-level block: paragraph, heading or quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub align: ElementFormat,
    pub indent: u32,
    pub runs: Vec<TextRun>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new(BlockKind::Paragraph)
    }
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            align: ElementFormat::Left,
            indent: 0,
            runs: Vec::new(),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::new(BlockKind::Paragraph).with_run(TextRun::plain(text))
    }

    pub fn with_run(mut self, run: TextRun) -> Self {
        self.runs.push(run);
        self.normalize();
        self
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(TextRun::char_len).sum()
    }

    /// Make sure a run boundary exists at `offset` (in chars).
    /// Returns the index of the first run starting at or after `offset`.
    pub fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].char_len();
            if offset == pos {
                return i;
            }
            if offset < pos + len {
                let byte = char_to_byte(&self.runs[i].text, offset - pos);
                let tail = self.runs[i].text.split_off(byte);
                let mut rest = self.runs[i].clone();
                rest.text = tail;
                self.runs.insert(i + 1, rest);
                return i + 1;
            }
            pos += len;
        }
        self.runs.len()
    }

    /// Index range of runs covering `[start, end)` chars, splitting runs at
    /// both boundaries as needed.
    pub fn isolate(&mut self, start: usize, end: usize) -> std::ops::Range<usize> {
        self.split_at(end);
        let start_idx = self.split_at(start);
        // Both boundaries exist now; this only looks the end index up again.
        let end_idx = self.split_at(end);
        start_idx..end_idx.max(start_idx)
    }

    /// Runs overlapping `[start, end)` chars, without splitting.
    pub fn runs_overlapping(&self, start: usize, end: usize) -> Vec<&TextRun> {
        let mut pos = 0;
        let mut out = Vec::new();
        for run in &self.runs {
            let len = run.char_len();
            if len > 0 && pos < end && pos + len > start {
                out.push(run);
            }
            pos += len;
        }
        out
    }

    /// The run holding the character just before `offset`, or the first run
    /// when `offset` is 0.
    pub fn run_before(&self, offset: usize) -> Option<&TextRun> {
        let mut pos = 0;
        for run in &self.runs {
            let len = run.char_len();
            if len == 0 {
                continue;
            }
            if offset <= pos + len && (offset > pos || pos == 0) {
                return Some(run);
            }
            pos += len;
        }
        self.runs.iter().rev().find(|r| !r.text.is_empty())
    }

    pub fn text_range(&self, start: usize, end: usize) -> String {
        self.text().chars().skip(start).take(end.saturating_sub(start)).collect()
    }

    /// Merge neighbouring runs with identical formatting and drop empty runs.
    pub fn normalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.same_format(&run) => prev.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

/// The whole rich-text document: an ordered list of top-level blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentModel {
    pub blocks: Vec<Block>,
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }
}

impl DocumentModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Text of every block joined with `\n`.
    pub fn plain_text(&self) -> String {
        self.blocks.iter().map(Block::text).collect::<Vec<_>>().join("\n")
    }

    /// Text between two points; block boundaries become `\n`.
    pub fn text_between(&self, start: Point, end: Point) -> String {
        let (start, end) = (self.clamp(start.min(end)), self.clamp(start.max(end)));
        let mut out = String::new();
        for b in start.block..=end.block {
            let Some(block) = self.blocks.get(b) else { break };
            let from = if b == start.block { start.offset } else { 0 };
            let to = if b == end.block { end.offset } else { block.char_len() };
            if b > start.block {
                out.push('\n');
            }
            out.push_str(&block.text_range(from, to));
        }
        out
    }

    /// Clamp a point so it addresses an existing block and offset.
    pub fn clamp(&self, point: Point) -> Point {
        if self.blocks.is_empty() {
            return Point::default();
        }
        let block = point.block.min(self.blocks.len() - 1);
        let offset = point.offset.min(self.blocks[block].char_len());
        Point::new(block, offset)
    }

    /// Map a character offset in [`plain_text`](Self::plain_text) to a point.
    pub fn point_at(&self, char_offset: usize) -> Point {
        let mut remaining = char_offset;
        for (i, block) in self.blocks.iter().enumerate() {
            let len = block.char_len();
            if remaining <= len {
                return Point::new(i, remaining);
            }
            remaining -= len + 1;
        }
        self.clamp(Point::new(usize::MAX, usize::MAX))
    }

    /// Inverse of [`point_at`](Self::point_at).
    pub fn char_offset_of(&self, point: Point) -> usize {
        let point = self.clamp(point);
        let before: usize = self.blocks[..point.block.min(self.blocks.len())]
            .iter()
            .map(|b| b.char_len() + 1)
            .sum();
        before + point.offset
    }

    pub fn end_point(&self) -> Point {
        match self.blocks.len() {
            0 => Point::default(),
            n => Point::new(n - 1, self.blocks[n - 1].char_len()),
        }
    }
}

/// Byte index of the `char_idx`-th character of `s` (or `s.len()`).
pub fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(b, _)| b).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::marks::TextMark;

    fn bold(text: &str) -> TextRun {
        TextRun::styled(text, MarkSet::empty().with(TextMark::Bold), StyleMap::new())
    }

    #[test]
    fn test_split_at_inside_run() {
        let mut block = Block::paragraph("hello world");
        let idx = block.split_at(5);
        assert_eq!(idx, 1);
        assert_eq!(block.runs.len(), 2);
        assert_eq!(block.runs[0].text, "hello");
        assert_eq!(block.runs[1].text, " world");
    }

    #[test]
    fn test_split_at_boundaries_is_noop() {
        let mut block = Block::paragraph("abc");
        assert_eq!(block.split_at(0), 0);
        assert_eq!(block.split_at(3), 1);
        assert_eq!(block.runs.len(), 1);
    }

    #[test]
    fn test_isolate_middle_of_single_run() {
        let mut block = Block::paragraph("abcdef");
        let range = block.isolate(2, 4);
        assert_eq!(range, 1..2);
        assert_eq!(block.runs[range.start].text, "cd");
    }

    #[test]
    fn test_isolate_across_runs() {
        let mut block = Block::paragraph("abc");
        block.runs.push(bold("def"));
        let range = block.isolate(1, 5);
        let texts: Vec<_> = block.runs[range].iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["bc", "de"]);
    }

    #[test]
    fn test_split_handles_multibyte() {
        let mut block = Block::paragraph("héllo");
        block.split_at(2);
        assert_eq!(block.runs[0].text, "hé");
        assert_eq!(block.runs[1].text, "llo");
    }

    #[test]
    fn test_normalize_merges_and_drops_empty() {
        let mut block = Block::new(BlockKind::Paragraph);
        block.runs = vec![TextRun::plain("a"), TextRun::plain(""), TextRun::plain("b"), bold("c")];
        block.normalize();
        assert_eq!(block.runs.len(), 2);
        assert_eq!(block.runs[0].text, "ab");
    }

    #[test]
    fn test_run_before() {
        let mut block = Block::paragraph("abc");
        block.runs.push(bold("def"));
        assert_eq!(block.run_before(0).unwrap().text, "abc");
        assert_eq!(block.run_before(3).unwrap().text, "abc");
        assert_eq!(block.run_before(4).unwrap().text, "def");
        assert!(Block::default().run_before(0).is_none());
    }

    #[test]
    fn test_point_mapping_roundtrip() {
        let doc = DocumentModel::from_blocks(vec![Block::paragraph("ab"), Block::paragraph(""), Block::paragraph("cde")]);
        assert_eq!(doc.plain_text(), "ab\n\ncde");
        assert_eq!(doc.point_at(0), Point::new(0, 0));
        assert_eq!(doc.point_at(2), Point::new(0, 2));
        assert_eq!(doc.point_at(3), Point::new(1, 0));
        assert_eq!(doc.point_at(4), Point::new(2, 0));
        assert_eq!(doc.point_at(99), Point::new(2, 3));
        for offset in 0..=7 {
            assert_eq!(doc.char_offset_of(doc.point_at(offset)), offset);
        }
    }

    #[test]
    fn test_text_between_spans_blocks() {
        let doc = DocumentModel::from_blocks(vec![Block::paragraph("first"), Block::paragraph("second")]);
        assert_eq!(doc.text_between(Point::new(0, 2), Point::new(1, 3)), "rst\nsec");
        assert_eq!(doc.text_between(Point::new(1, 3), Point::new(0, 2)), "rst\nsec");
    }

    #[test]
    fn test_clamp_on_empty_document() {
        let doc = DocumentModel::from_blocks(Vec::new());
        assert_eq!(doc.clamp(Point::new(3, 3)), Point::default());
        assert_eq!(doc.end_point(), Point::default());
    }
}
