use serde::{Deserialize, Serialize};

/// Boolean text attributes that can be applied to a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextMark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

impl TextMark {
    pub const ALL: [TextMark; 5] = [
        TextMark::Bold,
        TextMark::Italic,
        TextMark::Underline,
        TextMark::Strikethrough,
        TextMark::Code,
    ];

    /// Bit used for this mark in the serialized `format` mask.
    pub fn bit(self) -> u8 {
        match self {
            TextMark::Bold => 1,
            TextMark::Italic => 1 << 1,
            TextMark::Strikethrough => 1 << 2,
            TextMark::Underline => 1 << 3,
            TextMark::Code => 1 << 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextMark::Bold => "bold",
            TextMark::Italic => "italic",
            TextMark::Underline => "underline",
            TextMark::Strikethrough => "strikethrough",
            TextMark::Code => "code",
        }
    }

    /// Short label shown on the toolbar button.
    pub fn button_label(self) -> &'static str {
        match self {
            TextMark::Bold => "B",
            TextMark::Italic => "I",
            TextMark::Underline => "U",
            TextMark::Strikethrough => "S",
            TextMark::Code => "</>",
        }
    }
}

/// Set of [`TextMark`]s stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct MarkSet(u8);

impl From<u32> for MarkSet {
    fn from(bits: u32) -> Self {
        Self::from_bits((bits & u32::from(Self::KNOWN_BITS)) as u8)
    }
}

impl From<MarkSet> for u32 {
    fn from(set: MarkSet) -> Self {
        u32::from(set.0)
    }
}

impl MarkSet {
    const KNOWN_BITS: u8 = 0b1_1111;

    pub fn empty() -> Self {
        Self(0)
    }

    /// Build from a raw mask, dropping bits no mark uses.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::KNOWN_BITS)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, mark: TextMark) -> bool {
        self.0 & mark.bit() != 0
    }

    pub fn insert(&mut self, mark: TextMark) {
        self.0 |= mark.bit();
    }

    pub fn remove(&mut self, mark: TextMark) {
        self.0 &= !mark.bit();
    }

    pub fn toggle(&mut self, mark: TextMark) {
        self.0 ^= mark.bit();
    }

    pub fn set(&mut self, mark: TextMark, on: bool) {
        if on {
            self.insert(mark);
        } else {
            self.remove(mark);
        }
    }

    pub fn with(mut self, mark: TextMark) -> Self {
        self.insert(mark);
        self
    }

    pub fn iter(self) -> impl Iterator<Item = TextMark> {
        TextMark::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}
