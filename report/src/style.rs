//! Page geometry and palette

/// A4 in points
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

pub const MARGIN_TOP: f32 = 40.0;
pub const MARGIN_BOTTOM: f32 = 60.0;
pub const MARGIN_LEFT: f32 = 40.0;
pub const MARGIN_RIGHT: f32 = 40.0;

pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
/// Sections may not extend below this line
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN_BOTTOM;
/// Footer rule position
pub const FOOTER_RULE_Y: f32 = PAGE_HEIGHT - 40.0;

pub const TABLE_TITLE_HEIGHT: f32 = 20.0;
pub const TABLE_ROW_HEIGHT: f32 = 18.0;
pub const HEADER_HEIGHT: f32 = 65.0;
pub const HEALTH_CARD_HEIGHT: f32 = 110.0;
pub const HEALTH_BLOCK_HEIGHT: f32 = 120.0;
pub const COLUMN_GAP: f32 = 10.0;

pub const SECTION_GAP: f32 = 10.0;
pub const BLOCK_GAP: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Parse `#rrggbb`; anything else becomes mid grey
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.trim_start_matches('#');
        let channel = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .map(|v| v as f32 / 255.0)
        };
        match (digits.len(), channel(0), channel(2), channel(4)) {
            (6, Some(r), Some(g), Some(b)) => Self { r, g, b },
            _ => Self { r: 0.5, g: 0.5, b: 0.5 },
        }
    }
}

pub struct Palette;

impl Palette {
    pub fn primary() -> Color {
        Color::from_hex("#25995c")
    }
    pub fn light_green() -> Color {
        Color::from_hex("#f0fdf4")
    }
    pub fn dark_green() -> Color {
        Color::from_hex("#007236")
    }
    pub fn text_dark() -> Color {
        Color::from_hex("#1f2937")
    }
    pub fn text_light() -> Color {
        Color::from_hex("#6b7280")
    }
    pub fn border() -> Color {
        Color::from_hex("#e5e7eb")
    }
    pub fn white() -> Color {
        Color::from_hex("#ffffff")
    }
    pub fn row_alt() -> Color {
        Color::from_hex("#f8fafc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let c = Color::from_hex("#ff0080");
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_bad_hex_is_grey() {
        assert_eq!(Color::from_hex("nope").r, 0.5);
    }
}
