//! Document mutations used by [`RichTextEngine`](super::RichTextEngine).
//!
//! Every function works on block/character points and leaves each touched
//! block normalized.

use crate::app::domain::blocks::{BlockKind, ElementFormat};
use crate::app::domain::document::{Block, DocumentModel, TextRun};
use crate::app::domain::marks::{MarkSet, TextMark};
use crate::app::domain::selection::{Point, RangeSelection};
use crate::app::domain::style::StyleMap;

/// Apply `f` to every run inside `[start, end)`.
fn for_each_run_in(doc: &mut DocumentModel, start: Point, end: Point, mut f: impl FnMut(&mut TextRun)) {
    for b in start.block..=end.block {
        let Some(block) = doc.blocks.get_mut(b) else { break };
        let from = if b == start.block { start.offset } else { 0 };
        let to = if b == end.block { end.offset } else { block.char_len() };
        if from >= to {
            continue;
        }
        let range = block.isolate(from, to);
        for run in &mut block.runs[range] {
            f(run);
        }
        block.normalize();
    }
}

/// Toggle `mark` over a range: removed everywhere if every selected run
/// already has it, added everywhere otherwise. A caret flips its format.
pub fn format_text(doc: &mut DocumentModel, range: &mut RangeSelection, mark: TextMark) {
    if range.is_collapsed() {
        range.format.toggle(mark);
        return;
    }
    let (start, end) = (range.start(), range.end());
    let mut all_have = true;
    let mut any = false;
    for b in start.block..=end.block {
        let Some(block) = doc.block(b) else { break };
        let from = if b == start.block { start.offset } else { 0 };
        let to = if b == end.block { end.offset } else { block.char_len() };
        for run in block.runs_overlapping(from, to) {
            any = true;
            all_have &= run.marks.contains(mark);
        }
    }
    let on = if any { !all_have } else { !range.format.contains(mark) };
    for_each_run_in(doc, start, end, |run| run.marks.set(mark, on));
    range.format.set(mark, on);
}

/// Set or clear one style property. A caret records it for typed text.
pub fn patch_style(doc: &mut DocumentModel, range: &mut RangeSelection, key: &str, value: Option<&str>) {
    range.style.patch(key, value);
    if range.is_collapsed() {
        return;
    }
    for_each_run_in(doc, range.start(), range.end(), |run| run.style.patch(key, value));
}

pub fn clear_marks(doc: &mut DocumentModel, range: &mut RangeSelection) {
    range.format = MarkSet::empty();
    if range.is_collapsed() {
        return;
    }
    for_each_run_in(doc, range.start(), range.end(), |run| run.marks = MarkSet::empty());
}

/// Apply `f` to each block in the inclusive span. Returns whether any
/// block changed.
pub fn update_blocks(doc: &mut DocumentModel, span: (usize, usize), mut f: impl FnMut(&mut Block)) -> bool {
    let mut changed = false;
    for block in doc.blocks.iter_mut().take(span.1 + 1).skip(span.0) {
        let before = (block.kind, block.align, block.indent);
        f(block);
        changed |= before != (block.kind, block.align, block.indent);
    }
    changed
}

pub fn set_blocks_type(doc: &mut DocumentModel, span: (usize, usize), kind: BlockKind) -> bool {
    update_blocks(doc, span, |block| block.kind = kind)
}

pub fn format_element(doc: &mut DocumentModel, span: (usize, usize), align: ElementFormat) -> bool {
    update_blocks(doc, span, |block| block.align = align)
}

pub fn indent(doc: &mut DocumentModel, span: (usize, usize), delta: i32) -> bool {
    update_blocks(doc, span, |block| {
        block.indent = block.indent.saturating_add_signed(delta);
    })
}

/// Delete `[start, end)`, merging blocks when the range crosses a
/// boundary. Returns the collapsed point where the range started.
pub fn delete_range(doc: &mut DocumentModel, start: Point, end: Point) -> Point {
    let (start, end) = (doc.clamp(start.min(end)), doc.clamp(start.max(end)));
    if doc.blocks.is_empty() || start == end {
        return start;
    }
    if start.block == end.block {
        let block = &mut doc.blocks[start.block];
        let range = block.isolate(start.offset, end.offset);
        block.runs.drain(range);
        block.normalize();
        return start;
    }

    let tail = {
        let last = &mut doc.blocks[end.block];
        let idx = last.split_at(end.offset);
        last.runs.split_off(idx)
    };
    let first = &mut doc.blocks[start.block];
    let idx = first.split_at(start.offset);
    first.runs.truncate(idx);
    first.runs.extend(tail);
    first.normalize();
    doc.blocks.drain(start.block + 1..=end.block);
    start
}

/// Insert `text` at `at` with the given formatting. `\n` starts a new
/// block. Returns the point just after the inserted text.
pub fn insert_text(doc: &mut DocumentModel, at: Point, text: &str, marks: MarkSet, style: &StyleMap) -> Point {
    if doc.blocks.is_empty() {
        doc.blocks.push(Block::default());
    }
    let mut point = doc.clamp(at);
    for (i, segment) in text.split('\n').enumerate() {
        if i > 0 {
            point = split_block(doc, point);
        }
        if segment.is_empty() {
            continue;
        }
        let block = &mut doc.blocks[point.block];
        let idx = block.split_at(point.offset);
        block.runs.insert(idx, TextRun::styled(segment, marks, style.clone()));
        block.normalize();
        point.offset += segment.chars().count();
    }
    point
}

/// Split the block at `point`; the tail becomes a new block right after it.
/// Splitting a heading at its end yields a paragraph.
fn split_block(doc: &mut DocumentModel, point: Point) -> Point {
    let block = &mut doc.blocks[point.block];
    let idx = block.split_at(point.offset);
    let tail_runs = block.runs.split_off(idx);
    let kind = if block.kind.is_heading() && tail_runs.is_empty() {
        BlockKind::Paragraph
    } else {
        block.kind
    };
    let mut tail = Block::new(kind);
    tail.align = block.align;
    tail.indent = block.indent;
    tail.runs = tail_runs;
    tail.normalize();
    block.normalize();
    doc.blocks.insert(point.block + 1, tail);
    Point::new(point.block + 1, 0)
}

/// Marks and style a caret at `point` should adopt: those of the text just
/// before it.
pub fn caret_format_at(doc: &DocumentModel, point: Point) -> (MarkSet, StyleMap) {
    doc.block(point.block)
        .and_then(|b| b.run_before(point.offset))
        .map(|run| (run.marks, run.style.clone()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::blocks::HeadingLevel;
    use crate::app::domain::style::COLOR;

    fn doc(texts: &[&str]) -> DocumentModel {
        DocumentModel::from_blocks(texts.iter().map(|t| Block::paragraph(t)).collect())
    }

    fn bold() -> MarkSet {
        MarkSet::empty().with(TextMark::Bold)
    }

    #[test]
    fn test_format_text_adds_then_removes() {
        let mut d = doc(&["hello world"]);
        let mut range = RangeSelection::new(Point::new(0, 0), Point::new(0, 5));
        format_text(&mut d, &mut range, TextMark::Bold);
        assert_eq!(d.blocks[0].runs.len(), 2);
        assert_eq!(d.blocks[0].runs[0].text, "hello");
        assert!(d.blocks[0].runs[0].marks.contains(TextMark::Bold));
        assert!(range.format.contains(TextMark::Bold));

        format_text(&mut d, &mut range, TextMark::Bold);
        assert_eq!(d, doc(&["hello world"]));
    }

    #[test]
    fn test_format_text_partial_mark_is_added_to_all() {
        let mut d = doc(&["abcdef"]);
        let mut first = RangeSelection::new(Point::new(0, 0), Point::new(0, 3));
        format_text(&mut d, &mut first, TextMark::Italic);
        let mut all = RangeSelection::new(Point::new(0, 0), Point::new(0, 6));
        format_text(&mut d, &mut all, TextMark::Italic);
        assert_eq!(d.blocks[0].runs.len(), 1);
        assert!(d.blocks[0].runs[0].marks.contains(TextMark::Italic));
    }

    #[test]
    fn test_format_text_on_caret_only_changes_caret() {
        let mut d = doc(&["abc"]);
        let mut caret = RangeSelection::caret(Point::new(0, 1));
        format_text(&mut d, &mut caret, TextMark::Underline);
        assert!(caret.format.contains(TextMark::Underline));
        assert_eq!(d, doc(&["abc"]));
    }

    #[test]
    fn test_format_text_across_blocks() {
        let mut d = doc(&["one", "two"]);
        let mut range = RangeSelection::new(Point::new(1, 2), Point::new(0, 1));
        format_text(&mut d, &mut range, TextMark::Code);
        assert_eq!(d.blocks[0].runs[1].text, "ne");
        assert!(d.blocks[0].runs[1].marks.contains(TextMark::Code));
        assert_eq!(d.blocks[1].runs[0].text, "tw");
        assert!(d.blocks[1].runs[0].marks.contains(TextMark::Code));
    }

    #[test]
    fn test_patch_style_on_range_and_remove() {
        let mut d = doc(&["abcdef"]);
        let mut range = RangeSelection::new(Point::new(0, 2), Point::new(0, 4));
        patch_style(&mut d, &mut range, COLOR, Some("#f00"));
        assert_eq!(d.blocks[0].runs[1].style.get(COLOR), Some("#f00"));
        patch_style(&mut d, &mut range, COLOR, None);
        assert_eq!(d, doc(&["abcdef"]));
    }

    #[test]
    fn test_clear_marks_removes_everything() {
        let mut d = DocumentModel::from_blocks(vec![
            Block::new(BlockKind::Paragraph).with_run(TextRun::styled("ab", bold(), StyleMap::new())),
            Block::new(BlockKind::Paragraph)
                .with_run(TextRun::styled("cd", MarkSet::empty().with(TextMark::Italic), StyleMap::new())),
        ]);
        let mut range = RangeSelection::new(Point::new(0, 0), Point::new(1, 2));
        clear_marks(&mut d, &mut range);
        assert!(d.blocks.iter().flat_map(|b| &b.runs).all(|r| r.marks.is_empty()));
    }

    #[test]
    fn test_set_blocks_type_span() {
        let mut d = doc(&["a", "b", "c"]);
        assert!(set_blocks_type(&mut d, (0, 1), BlockKind::Heading(HeadingLevel::H1)));
        assert!(d.blocks[0].kind.is_heading());
        assert!(d.blocks[1].kind.is_heading());
        assert_eq!(d.blocks[2].kind, BlockKind::Paragraph);
        assert!(!set_blocks_type(&mut d, (0, 1), BlockKind::Heading(HeadingLevel::H1)));
    }

    #[test]
    fn test_outdent_stops_at_zero() {
        let mut d = doc(&["a"]);
        assert!(indent(&mut d, (0, 0), 1));
        assert_eq!(d.blocks[0].indent, 1);
        assert!(indent(&mut d, (0, 0), -1));
        assert!(!indent(&mut d, (0, 0), -1));
        assert_eq!(d.blocks[0].indent, 0);
    }

    #[test]
    fn test_delete_within_block() {
        let mut d = doc(&["hello world"]);
        let at = delete_range(&mut d, Point::new(0, 5), Point::new(0, 11));
        assert_eq!(at, Point::new(0, 5));
        assert_eq!(d.plain_text(), "hello");
    }

    #[test]
    fn test_delete_across_blocks_merges() {
        let mut d = doc(&["first", "middle", "last"]);
        d.blocks[2].runs[0].marks = bold();
        let at = delete_range(&mut d, Point::new(0, 3), Point::new(2, 2));
        assert_eq!(at, Point::new(0, 3));
        assert_eq!(d.block_count(), 1);
        assert_eq!(d.plain_text(), "first");
        assert!(d.blocks[0].runs[1].marks.contains(TextMark::Bold));
    }

    #[test]
    fn test_insert_text_with_caret_format() {
        let mut d = doc(&["ac"]);
        let end = insert_text(&mut d, Point::new(0, 1), "b", bold(), &StyleMap::new());
        assert_eq!(end, Point::new(0, 2));
        assert_eq!(d.plain_text(), "abc");
        assert_eq!(d.blocks[0].runs.len(), 3);
        assert!(d.blocks[0].runs[1].marks.contains(TextMark::Bold));
    }

    #[test]
    fn test_insert_newline_splits_block() {
        let mut d = doc(&["headline"]);
        d.blocks[0].kind = BlockKind::Heading(HeadingLevel::H2);
        d.blocks[0].align = ElementFormat::Center;
        let end = insert_text(&mut d, Point::new(0, 4), "\n", MarkSet::empty(), &StyleMap::new());
        assert_eq!(end, Point::new(1, 0));
        assert_eq!(d.plain_text(), "head\nline");
        assert_eq!(d.blocks[1].kind, BlockKind::Heading(HeadingLevel::H2));
        assert_eq!(d.blocks[1].align, ElementFormat::Center);
    }

    #[test]
    fn test_enter_at_end_of_heading_makes_paragraph() {
        let mut d = doc(&["Title"]);
        d.blocks[0].kind = BlockKind::Heading(HeadingLevel::H1);
        let end = insert_text(&mut d, Point::new(0, 5), "\nbody", MarkSet::empty(), &StyleMap::new());
        assert_eq!(end, Point::new(1, 4));
        assert_eq!(d.blocks[1].kind, BlockKind::Paragraph);
        assert_eq!(d.plain_text(), "Title\nbody");
    }

    #[test]
    fn test_insert_into_empty_document() {
        let mut d = DocumentModel::from_blocks(Vec::new());
        insert_text(&mut d, Point::default(), "x", MarkSet::empty(), &StyleMap::new());
        assert_eq!(d.plain_text(), "x");
    }

    #[test]
    fn test_caret_format_follows_preceding_text() {
        let mut d = doc(&["ab"]);
        d.blocks[0].runs.push(TextRun::styled("cd", bold(), StyleMap::parse("color: #00f")));
        let (marks, style) = caret_format_at(&d, Point::new(0, 4));
        assert_eq!(marks, bold());
        assert_eq!(style.get(COLOR), Some("#00f"));
        let (marks, _) = caret_format_at(&d, Point::new(0, 1));
        assert!(marks.is_empty());
    }
}
