//! Low-level PDF drawing on top of lopdf
//!
//! Callers work in top-left page coordinates (y grows downwards, like the
//! layout tree); [`Canvas`] flips them into PDF user space.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::RenderResult;
use crate::style::{Color, PAGE_HEIGHT, PAGE_WIDTH};

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const LOGO_NAME: &str = "Logo";

/// Bezier handle length for a quarter circle
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => FONT_REGULAR,
            Font::Bold => FONT_BOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Decoded RGB raster embedded as the header logo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl LogoImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Self {
            width,
            height,
            rgb: rgb.into_raw(),
        })
    }
}

// ============================================================================
// Text metrics
// ============================================================================

/// Approximate Helvetica advance width in thousandths of an em
fn glyph_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '!' | '|' | '\'' => 250.0,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '/' | '-' => 320.0,
        'm' | 'w' | 'M' | 'W' | '%' | '@' => 850.0,
        '0'..='9' | 'a'..='z' => 556.0,
        'A'..='Z' => 680.0,
        _ => 600.0,
    }
}

pub fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let em: f32 = text.chars().map(glyph_width).sum();
    let weight = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.06,
    };
    em / 1000.0 * size * weight
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`
pub fn fit_text(text: &str, max_width: f32, size: f32, font: Font) -> String {
    if text_width(text, size, font) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>().trim_end().to_string() + "...";
        if text_width(&candidate, size, font) <= max_width {
            return candidate;
        }
    }
    "...".to_string()
}

/// Encode for the standard 14 fonts with WinAnsiEncoding. Latin-1 maps
/// through directly; anything outside it prints as `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            0x2026 => 0x85,
            0x2013 => 0x96,
            0x2014 => 0x97,
            _ => b'?',
        })
        .collect()
}

// ============================================================================
// Canvas
// ============================================================================

/// Content stream for a single page
#[derive(Debug, Default)]
pub struct Canvas {
    ops: Vec<Operation>,
}

fn flip(y: f32) -> f32 {
    PAGE_HEIGHT - y
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn fill_color(&mut self, c: Color) {
        self.op("rg", vec![c.r.into(), c.g.into(), c.b.into()]);
    }

    fn stroke_color(&mut self, c: Color) {
        self.op("RG", vec![c.r.into(), c.g.into(), c.b.into()]);
    }

    fn rect_path(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.op("re", vec![x.into(), flip(y + h).into(), w.into(), h.into()]);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.fill_color(color);
        self.rect_path(x, y, w, h);
        self.op("f", vec![]);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line_width: f32) {
        self.stroke_color(color);
        self.op("w", vec![line_width.into()]);
        self.rect_path(x, y, w, h);
        self.op("S", vec![]);
    }

    pub fn fill_and_stroke_rect(
        &mut self,
        (x, y, w, h): (f32, f32, f32, f32),
        fill: Color,
        stroke: Color,
        line_width: f32,
    ) {
        self.fill_color(fill);
        self.stroke_color(stroke);
        self.op("w", vec![line_width.into()]);
        self.rect_path(x, y, w, h);
        self.op("B", vec![]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32) {
        self.stroke_color(color);
        self.op("w", vec![line_width.into()]);
        self.op("m", vec![from.0.into(), flip(from.1).into()]);
        self.op("l", vec![to.0.into(), flip(to.1).into()]);
        self.op("S", vec![]);
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        let cy = flip(cy);
        let k = r * KAPPA;
        self.fill_color(color);
        self.op("m", vec![(cx + r).into(), cy.into()]);
        let quarters = [
            [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
            [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
            [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
            [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
        ];
        for q in quarters {
            self.op("c", q.iter().map(|v| (*v).into()).collect());
        }
        self.op("f", vec![]);
    }

    /// Draw a single line of text whose top edge sits at `y`. For centred or
    /// right-aligned text `x` and `width` describe the box to align within.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        width: f32,
        align: Align,
        size: f32,
        font: Font,
        color: Color,
    ) {
        let advance = text_width(text, size, font);
        let left = match align {
            Align::Left => x,
            Align::Center => x + (width - advance) / 2.0,
            Align::Right => x + width - advance,
        };
        let baseline = flip(y + size * 0.8);
        self.fill_color(color);
        self.op("BT", vec![]);
        self.op("Tf", vec![font.resource_name().into(), size.into()]);
        self.op("Td", vec![left.into(), baseline.into()]);
        self.op(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    pub fn left_text(&mut self, text: &str, x: f32, y: f32, size: f32, font: Font, color: Color) {
        self.text(text, x, y, 0.0, Align::Left, size, font, color);
    }

    pub fn image(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                w.into(),
                Object::Integer(0),
                Object::Integer(0),
                h.into(),
                x.into(),
                flip(y + h).into(),
            ],
        );
        self.op("Do", vec![LOGO_NAME.into()]);
        self.op("Q", vec![]);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }
}

// ============================================================================
// Document
// ============================================================================

/// Assemble pages into a PDF byte buffer. No timestamps or random IDs are
/// written, so equal input produces equal bytes.
pub fn write_document(pages: Vec<Canvas>, logo: Option<&LogoImage>) -> RenderResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut resources = dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
    };
    if let Some(logo) = logo {
        let logo_id = add_logo(&mut doc, logo);
        resources.set("XObject", dictionary! { LOGO_NAME => logo_id });
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for canvas in pages {
        let content = Content {
            operations: canvas.ops,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                PAGE_WIDTH.into(),
                PAGE_HEIGHT.into(),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_logo(doc: &mut Document, logo: &LogoImage) -> ObjectId {
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => logo.width as i64,
            "Height" => logo.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        logo.rgb.clone(),
    );
    doc.add_object(stream)
}
