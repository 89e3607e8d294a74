use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
        }
    }

    /// Font size multiplier used when rendering heading text.
    pub fn scale(self) -> f32 {
        match self {
            HeadingLevel::H1 => 1.6,
            HeadingLevel::H2 => 1.35,
            HeadingLevel::H3 => 1.15,
        }
    }
}

/// Structural role of a top-level block in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading(HeadingLevel),
    Quote,
}

impl BlockKind {
    pub fn is_heading(self) -> bool {
        matches!(self, BlockKind::Heading(_))
    }
}

/// Block types the toolbar knows how to display and request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    #[default]
    Paragraph,
    H1,
    H2,
    H3,
}

impl BlockType {
    pub const ALL: [BlockType; 4] = [BlockType::Paragraph, BlockType::H1, BlockType::H2, BlockType::H3];

    /// Toolbar projection of a block kind. Kinds without a toolbar entry
    /// fall back to `Paragraph`.
    pub fn from_kind(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Heading(HeadingLevel::H1) => BlockType::H1,
            BlockKind::Heading(HeadingLevel::H2) => BlockType::H2,
            BlockKind::Heading(HeadingLevel::H3) => BlockType::H3,
            BlockKind::Paragraph | BlockKind::Quote => BlockType::Paragraph,
        }
    }

    pub fn to_kind(self) -> BlockKind {
        match self {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::H1 => BlockKind::Heading(HeadingLevel::H1),
            BlockType::H2 => BlockKind::Heading(HeadingLevel::H2),
            BlockType::H3 => BlockKind::Heading(HeadingLevel::H3),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BlockType::Paragraph => "Normal",
            BlockType::H1 => "Heading 1",
            BlockType::H2 => "Heading 2",
            BlockType::H3 => "Heading 3",
        }
    }
}

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementFormat {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl ElementFormat {
    pub const ALL: [ElementFormat; 4] = [
        ElementFormat::Left,
        ElementFormat::Center,
        ElementFormat::Right,
        ElementFormat::Justify,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementFormat::Left => "left",
            ElementFormat::Center => "center",
            ElementFormat::Right => "right",
            ElementFormat::Justify => "justify",
        }
    }

    /// Parse the serialized form. An empty string means the default (left).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "left" | "start" => Some(ElementFormat::Left),
            "center" => Some(ElementFormat::Center),
            "right" | "end" => Some(ElementFormat::Right),
            "justify" => Some(ElementFormat::Justify),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ElementFormat::Left => "Left Align",
            ElementFormat::Center => "Center Align",
            ElementFormat::Right => "Right Align",
            ElementFormat::Justify => "Justify Align",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_from_kind() {
        assert_eq!(BlockType::from_kind(BlockKind::Heading(HeadingLevel::H2)), BlockType::H2);
        assert_eq!(BlockType::from_kind(BlockKind::Paragraph), BlockType::Paragraph);
        assert_eq!(BlockType::from_kind(BlockKind::Quote), BlockType::Paragraph);
    }

    #[test]
    fn test_block_type_kind_roundtrip() {
        for ty in BlockType::ALL {
            assert_eq!(BlockType::from_kind(ty.to_kind()), ty);
        }
    }

    #[test]
    fn test_element_format_parse() {
        assert_eq!(ElementFormat::parse(""), Some(ElementFormat::Left));
        assert_eq!(ElementFormat::parse("justify"), Some(ElementFormat::Justify));
        assert_eq!(ElementFormat::parse("end"), Some(ElementFormat::Right));
        assert_eq!(ElementFormat::parse("diagonal"), None);
    }

    #[test]
    fn test_heading_level_serialization() {
        assert_eq!(serde_json::to_string(&HeadingLevel::H3).unwrap(), "\"h3\"");
    }
}
