use super::marks::MarkSet;
use super::style::StyleMap;

/// A position in the document: top-level block index plus a character
/// offset into that block's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor/focus selection. When `anchor == focus` it is a caret.
///
/// `format` and `style` describe the caret: text typed at a collapsed
/// selection picks them up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSelection {
    pub anchor: Point,
    pub focus: Point,
    pub format: MarkSet,
    pub style: StyleMap,
}

impl RangeSelection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self {
            anchor,
            focus,
            format: MarkSet::empty(),
            style: StyleMap::new(),
        }
    }

    pub fn caret(point: Point) -> Self {
        Self::new(point, point)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    pub fn start(&self) -> Point {
        self.anchor.min(self.focus)
    }

    pub fn end(&self) -> Point {
        self.anchor.max(self.focus)
    }

    /// Collapse onto `point`, keeping caret format and style.
    pub fn collapse_to(&mut self, point: Point) {
        self.anchor = point;
        self.focus = point;
    }
}

/// Whole-block selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeSelection {
    pub block: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Range(RangeSelection),
    Node(NodeSelection),
}

impl Selection {
    pub fn caret(block: usize, offset: usize) -> Self {
        Selection::Range(RangeSelection::caret(Point::new(block, offset)))
    }

    pub fn range(anchor: Point, focus: Point) -> Self {
        Selection::Range(RangeSelection::new(anchor, focus))
    }

    pub fn node(block: usize) -> Self {
        Selection::Node(NodeSelection { block })
    }

    pub fn as_range(&self) -> Option<&RangeSelection> {
        match self {
            Selection::Range(range) => Some(range),
            Selection::Node(_) => None,
        }
    }

    /// Inclusive first and last block index touched by the selection.
    pub fn block_span(&self) -> (usize, usize) {
        match self {
            Selection::Range(range) => (range.start().block, range.end().block),
            Selection::Node(node) => (node.block, node.block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_range_normalizes() {
        let range = RangeSelection::new(Point::new(2, 1), Point::new(0, 4));
        assert!(range.is_backward());
        assert_eq!(range.start(), Point::new(0, 4));
        assert_eq!(range.end(), Point::new(2, 1));
    }

    #[test]
    fn test_caret_is_collapsed() {
        let sel = Selection::caret(1, 3);
        assert!(sel.as_range().unwrap().is_collapsed());
        assert_eq!(sel.block_span(), (1, 1));
    }

    #[test]
    fn test_node_selection_has_no_range() {
        let sel = Selection::node(4);
        assert!(sel.as_range().is_none());
        assert_eq!(sel.block_span(), (4, 4));
    }
}
