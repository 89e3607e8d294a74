//! Document rendering into the editor's text and style buffers.
//!
//! Every distinct run appearance gets a style character (`'A'`, `'B'`, ...)
//! backed by a `StyleTableEntryExt`. The style string carries one character
//! per byte of the text, as FLTK's highlight data expects.

use std::collections::HashMap;

use fltk::enums::{Color, Font};
use fltk::text::{StyleTableEntryExt, TextAttr};

use crate::app::domain::blocks::BlockKind;
use crate::app::domain::document::{Block, DocumentModel, TextRun};
use crate::app::domain::marks::TextMark;
use crate::app::domain::style::{self, BACKGROUND_COLOR, COLOR, FONT_FAMILY, FONT_SIZE};

/// Style characters run from 'A' to '~'.
const MAX_STYLES: usize = (b'~' - b'A' + 1) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Family {
    Sans,
    Serif,
    Mono,
}

fn family_of(run: &TextRun) -> Family {
    if run.marks.contains(TextMark::Code) {
        return Family::Mono;
    }
    let family = run.style.get(FONT_FAMILY).unwrap_or("").to_ascii_lowercase();
    if family.contains("mono") || family.contains("courier") || family.contains("consol") {
        Family::Mono
    } else if family.contains("sans") || family.is_empty() {
        Family::Sans
    } else if family.contains("serif") || family.contains("times") || family.contains("georgia") {
        Family::Serif
    } else {
        Family::Sans
    }
}

fn font_for(family: Family, bold: bool, italic: bool) -> Font {
    match (family, bold, italic) {
        (Family::Sans, false, false) => Font::Helvetica,
        (Family::Sans, true, false) => Font::HelveticaBold,
        (Family::Sans, false, true) => Font::HelveticaItalic,
        (Family::Sans, true, true) => Font::HelveticaBoldItalic,
        (Family::Serif, false, false) => Font::Times,
        (Family::Serif, true, false) => Font::TimesBold,
        (Family::Serif, false, true) => Font::TimesItalic,
        (Family::Serif, true, true) => Font::TimesBoldItalic,
        (Family::Mono, false, false) => Font::Courier,
        (Family::Mono, true, false) => Font::CourierBold,
        (Family::Mono, false, true) => Font::CourierItalic,
        (Family::Mono, true, true) => Font::CourierBoldItalic,
    }
}

/// Resolved appearance of a run inside its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunLook {
    family: Family,
    bold: bool,
    italic: bool,
    size: i32,
    color: Option<(u8, u8, u8)>,
    background: Option<(u8, u8, u8)>,
    underline: bool,
    strike: bool,
    quote: bool,
}

impl RunLook {
    pub fn resolve(block: &Block, run: &TextRun, base_size: u32) -> Self {
        let size = run
            .style
            .get(FONT_SIZE)
            .and_then(style::parse_font_size)
            .unwrap_or(base_size);
        let scale = match block.kind {
            BlockKind::Heading(level) => level.scale(),
            _ => 1.0,
        };
        Self {
            family: family_of(run),
            bold: run.marks.contains(TextMark::Bold) || block.kind.is_heading(),
            italic: run.marks.contains(TextMark::Italic) || block.kind == BlockKind::Quote,
            size: (size as f32 * scale).round() as i32,
            color: run.style.get(COLOR).and_then(style::parse_hex_color),
            background: run.style.get(BACKGROUND_COLOR).and_then(style::parse_hex_color),
            underline: run.marks.contains(TextMark::Underline),
            strike: run.marks.contains(TextMark::Strikethrough),
            quote: block.kind == BlockKind::Quote,
        }
    }

    fn plain(base_size: u32) -> Self {
        Self {
            family: Family::Sans,
            bold: false,
            italic: false,
            size: base_size as i32,
            color: None,
            background: None,
            underline: false,
            strike: false,
            quote: false,
        }
    }
}

/// Maps run appearances to FLTK style characters, building the style
/// table as new appearances are met.
pub struct StylePalette {
    look_to_char: HashMap<RunLook, char>,
    entries: Vec<StyleTableEntryExt>,
    base_size: u32,
    dark: bool,
}

impl StylePalette {
    pub fn new(base_size: u32, dark: bool) -> Self {
        let mut palette = Self {
            look_to_char: HashMap::new(),
            entries: Vec::new(),
            base_size,
            dark,
        };
        palette.clear();
        palette
    }

    fn default_text_color(&self, quote: bool) -> Color {
        match (quote, self.dark) {
            (true, true) => Color::from_rgb(160, 160, 160),
            (true, false) => Color::from_rgb(100, 100, 100),
            (false, true) => Color::from_rgb(220, 220, 220),
            (false, false) => Color::Black,
        }
    }

    fn entry_for(&self, look: &RunLook) -> StyleTableEntryExt {
        let mut attr = TextAttr::None;
        if look.underline {
            attr |= TextAttr::Underline;
        }
        if look.strike {
            attr |= TextAttr::StrikeThrough;
        }
        let bgcolor = match look.background {
            Some((r, g, b)) => {
                attr |= TextAttr::BgColor;
                Color::from_rgb(r, g, b)
            }
            None => Color::Background2,
        };
        StyleTableEntryExt {
            color: match look.color {
                Some((r, g, b)) => Color::from_rgb(r, g, b),
                None => self.default_text_color(look.quote),
            },
            font: font_for(look.family, look.bold, look.italic),
            size: look.size,
            attr,
            bgcolor,
        }
    }

    /// Style character for `look`, adding a table entry if needed. Once the
    /// table is full, new appearances fall back to plain text.
    pub fn get_or_insert(&mut self, look: RunLook) -> char {
        if let Some(&ch) = self.look_to_char.get(&look) {
            return ch;
        }
        let idx = self.entries.len();
        if idx >= MAX_STYLES {
            log::debug!("Style table full, rendering run as plain text");
            return 'A';
        }
        let ch = (b'A' + idx as u8) as char;
        let entry = self.entry_for(&look);
        self.entries.push(entry);
        self.look_to_char.insert(look, ch);
        ch
    }

    /// Style table entries for FLTK's `set_highlight_data_ext`.
    pub fn entries(&self) -> &[StyleTableEntryExt] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every mapping; 'A' is re-inserted as plain text.
    pub fn clear(&mut self) {
        self.look_to_char.clear();
        self.entries.clear();
        let plain = RunLook::plain(self.base_size);
        self.get_or_insert(plain);
    }

    /// Change base size or theme. Existing characters are invalidated.
    pub fn reconfigure(&mut self, base_size: u32, dark: bool) {
        self.base_size = base_size;
        self.dark = dark;
        self.clear();
    }

    pub fn base_size(&self) -> u32 {
        self.base_size
    }
}

/// Plain text of a document and its matching style string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub text: String,
    pub styles: String,
}

/// Render `document`, rebuilding the palette from the runs it holds now.
pub fn render(document: &DocumentModel, palette: &mut StylePalette) -> RenderedDocument {
    palette.clear();
    let mut text = String::new();
    let mut styles = String::new();
    let base = palette.base_size();
    for (i, block) in document.blocks.iter().enumerate() {
        if i > 0 {
            text.push('\n');
            styles.push('A');
        }
        for run in &block.runs {
            let ch = palette.get_or_insert(RunLook::resolve(block, run, base));
            text.push_str(&run.text);
            styles.extend(std::iter::repeat_n(ch, run.text.len()));
        }
    }
    RenderedDocument { text, styles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::blocks::HeadingLevel;
    use crate::app::domain::marks::MarkSet;
    use crate::app::domain::style::StyleMap;

    fn bold(text: &str) -> TextRun {
        TextRun::styled(text, MarkSet::empty().with(TextMark::Bold), StyleMap::new())
    }

    #[test]
    fn test_styles_match_byte_length() {
        let doc = DocumentModel::from_blocks(vec![
            Block::paragraph("Temp 38.5\u{b0}C"),
            Block::paragraph("").with_run(bold("Dx")),
        ]);
        let mut palette = StylePalette::new(15, false);
        let out = render(&doc, &mut palette);
        assert_eq!(out.text, "Temp 38.5\u{b0}C\nDx");
        assert_eq!(out.styles.len(), out.text.len());
        assert!(out.styles.ends_with("BB"));
    }

    #[test]
    fn test_same_look_shares_character() {
        let doc = DocumentModel::from_blocks(vec![
            Block::paragraph("").with_run(bold("a")),
            Block::paragraph("").with_run(bold("b")),
        ]);
        let mut palette = StylePalette::new(15, false);
        let out = render(&doc, &mut palette);
        assert_eq!(out.styles, "BAB");
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn test_heading_scales_and_bolds() {
        let block = Block::new(BlockKind::Heading(HeadingLevel::H1)).with_run(TextRun::plain("Plan"));
        let look = RunLook::resolve(&block, &block.runs[0], 15);
        assert!(look.bold);
        assert_eq!(look.size, 24);
    }

    #[test]
    fn test_run_styles_resolve() {
        let run = TextRun::styled(
            "x",
            MarkSet::empty().with(TextMark::Code).with(TextMark::Underline),
            StyleMap::parse("font-size: 20px; color: #f00; background-color: #ffff00"),
        );
        let block = Block::paragraph("").with_run(run);
        let look = RunLook::resolve(&block, &block.runs[0], 15);
        assert_eq!(look.family, Family::Mono);
        assert_eq!(look.size, 20);
        assert_eq!(look.color, Some((255, 0, 0)));
        assert_eq!(look.background, Some((255, 255, 0)));
        assert!(look.underline);
        assert!(!look.strike);
    }

    #[test]
    fn test_font_family_mapping() {
        let serif = TextRun::styled("x", MarkSet::empty(), StyleMap::parse("font-family: Georgia, serif"));
        let sans = TextRun::styled("x", MarkSet::empty(), StyleMap::parse("font-family: Arial, sans-serif"));
        assert_eq!(family_of(&serif), Family::Serif);
        assert_eq!(family_of(&sans), Family::Sans);
    }

    #[test]
    fn test_full_table_falls_back_to_plain() {
        let mut palette = StylePalette::new(15, false);
        for size in 0..(MAX_STYLES as i32 + 5) {
            let look = RunLook {
                size: 30 + size,
                ..RunLook::plain(15)
            };
            palette.get_or_insert(look);
        }
        assert_eq!(palette.len(), MAX_STYLES);
        let overflow = RunLook {
            size: 500,
            ..RunLook::plain(15)
        };
        assert_eq!(palette.get_or_insert(overflow), 'A');
    }

    #[test]
    fn test_palette_rebuilt_on_each_render() {
        let mut palette = StylePalette::new(15, false);
        for size in 0..70 {
            let run = TextRun::styled("x", MarkSet::empty(), StyleMap::parse(&format!("font-size: {}px", 20 + size)));
            render(&DocumentModel::from_blocks(vec![Block::paragraph("").with_run(run)]), &mut palette);
        }
        assert_eq!(palette.len(), 2);

        let red_bold = TextRun::styled(
            "Allergy",
            MarkSet::empty().with(TextMark::Bold),
            StyleMap::parse("color: #ff0000"),
        );
        let out = render(&DocumentModel::from_blocks(vec![Block::paragraph("").with_run(red_bold)]), &mut palette);
        assert_eq!(out.styles, "BBBBBBB");
        assert_eq!(palette.entries()[1].color, Color::from_rgb(255, 0, 0));
        assert_eq!(palette.entries()[1].font, Font::HelveticaBold);
    }

    #[test]
    fn test_clear_keeps_plain_entry() {
        let mut palette = StylePalette::new(15, false);
        palette.get_or_insert(RunLook { size: 40, ..RunLook::plain(15) });
        palette.clear();
        assert!(!palette.is_empty());
        assert_eq!(palette.len(), 1);
    }
}
