//! Paint paginated sections onto PDF canvases

use crate::layout::{page_label, CropCard, Cover, HealthCard, NutrientRow, Page, Row, Section};
use crate::pdf::{fit_text, Align, Canvas, Font};
use crate::style::{
    Color, Palette, COLUMN_GAP, CONTENT_WIDTH, FOOTER_RULE_Y, HEALTH_CARD_HEIGHT, MARGIN_LEFT,
    PAGE_HEIGHT, PAGE_WIDTH, TABLE_ROW_HEIGHT, TABLE_TITLE_HEIGHT,
};

pub const PLATFORM_NAME: &str = "SOILY";
pub const HEADER_TAGLINE: &str = "Digital Soil Mapping & Crop Recommendation Platform";
pub const HEADER_REGION: &str = "Using Satellite Imagery for Western Maharashtra";
pub const FOOTER_BRAND: &str = "SOILY - Digital Soil Mapping Platform";

const RIGHT_EDGE: f32 = MARGIN_LEFT + CONTENT_WIDTH;

/// Everything the painter needs besides the page itself
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions<'a> {
    /// Pixel size of the embedded logo, if any
    pub logo_size: Option<(u32, u32)>,
    pub generated_on: &'a str,
}

pub fn draw_pages(pages: &[Page<'_>], options: DrawOptions<'_>) -> Vec<Canvas> {
    let total = pages.len();
    pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let mut canvas = Canvas::new();
            for placed in &page.sections {
                draw_section(&mut canvas, placed.section, placed.y, options);
            }
            draw_footer(&mut canvas, index + 1, total, options.generated_on);
            canvas
        })
        .collect()
}

fn draw_section(canvas: &mut Canvas, section: &Section, y: f32, options: DrawOptions<'_>) {
    match section {
        Section::Cover(cover) => draw_cover(canvas, cover, options.logo_size),
        Section::Header { title } => draw_header(canvas, title, y, options.logo_size),
        Section::Table { title, rows } => draw_table(canvas, title, rows, y),
        Section::Nutrients { title, rows } => draw_nutrients(canvas, title, rows, y),
        Section::HealthAndCrops { health, crop } => {
            let column = (CONTENT_WIDTH - COLUMN_GAP) / 2.0;
            draw_health_card(canvas, health, MARGIN_LEFT, y, column);
            draw_crop_card(canvas, crop, MARGIN_LEFT + column + COLUMN_GAP, y, column);
        }
    }
}

/// Place the logo inside a box, keeping its aspect ratio
fn draw_logo(canvas: &mut Canvas, (width, height): (u32, u32), x: f32, y: f32, w: f32, h: f32) {
    if width == 0 || height == 0 {
        return;
    }
    let scale = (w / width as f32).min(h / height as f32);
    let (dw, dh) = (width as f32 * scale, height as f32 * scale);
    canvas.image(x + (w - dw) / 2.0, y + (h - dh) / 2.0, dw, dh);
}

fn draw_header(canvas: &mut Canvas, title: &str, y: f32, logo: Option<(u32, u32)>) {
    let (logo_w, logo_h) = (60.0, 45.0);
    match logo {
        Some(size) => draw_logo(canvas, size, MARGIN_LEFT, y, logo_w, logo_h),
        None => {
            canvas.fill_rect(MARGIN_LEFT, y, logo_w, logo_h, Palette::primary());
            canvas.text(
                PLATFORM_NAME,
                MARGIN_LEFT,
                y + 15.0,
                logo_w,
                Align::Center,
                14.0,
                Font::Bold,
                Palette::white(),
            );
        }
    }

    let text_x = 115.0;
    canvas.left_text(title, text_x, y + 5.0, 16.0, Font::Bold, Palette::primary());
    canvas.left_text(HEADER_TAGLINE, text_x, y + 25.0, 9.0, Font::Regular, Palette::text_light());
    canvas.left_text(HEADER_REGION, text_x, y + 37.0, 8.0, Font::Regular, Palette::text_light());
    canvas.line((MARGIN_LEFT, y + 55.0), (RIGHT_EDGE, y + 55.0), Palette::border(), 1.0);
}

fn draw_title_bar(canvas: &mut Canvas, title: &str, y: f32) {
    canvas.fill_rect(MARGIN_LEFT, y, CONTENT_WIDTH, TABLE_TITLE_HEIGHT, Palette::light_green());
    canvas.left_text(title, MARGIN_LEFT + 10.0, y + 7.0, 10.0, Font::Bold, Palette::primary());
}

fn draw_row_band(canvas: &mut Canvas, index: usize, y: f32) {
    let fill = if index % 2 == 0 {
        Palette::white()
    } else {
        Palette::row_alt()
    };
    canvas.fill_rect(MARGIN_LEFT, y, CONTENT_WIDTH, TABLE_ROW_HEIGHT, fill);
    canvas.stroke_rect(MARGIN_LEFT, y, CONTENT_WIDTH, TABLE_ROW_HEIGHT, Palette::border(), 0.5);
}

fn draw_table(canvas: &mut Canvas, title: &str, rows: &[Row], y: f32) {
    let label_width = CONTENT_WIDTH * 0.4;
    let value_width = CONTENT_WIDTH * 0.6;

    draw_title_bar(canvas, title, y);
    for (index, row) in rows.iter().enumerate() {
        let row_y = y + TABLE_TITLE_HEIGHT + TABLE_ROW_HEIGHT * index as f32;
        draw_row_band(canvas, index, row_y);

        let label = fit_text(&row.label, label_width - 10.0, 9.0, Font::Bold);
        canvas.left_text(&label, MARGIN_LEFT + 10.0, row_y + 5.0, 9.0, Font::Bold, Palette::text_dark());
        let value = fit_text(&row.value, value_width - 10.0, 9.0, Font::Regular);
        canvas.left_text(
            &value,
            MARGIN_LEFT + label_width,
            row_y + 5.0,
            9.0,
            Font::Regular,
            Palette::text_dark(),
        );
    }
}

fn draw_nutrients(canvas: &mut Canvas, title: &str, rows: &[NutrientRow], y: f32) {
    let value_x = MARGIN_LEFT + CONTENT_WIDTH * 0.3;
    let status_x = MARGIN_LEFT + CONTENT_WIDTH * 0.6;

    draw_title_bar(canvas, title, y);
    for (label, x) in [("NUTRIENT", MARGIN_LEFT + 10.0), ("VALUE", value_x), ("STATUS", status_x)] {
        canvas.left_text(label, x, y + 25.0, 8.0, Font::Bold, Palette::text_dark());
    }

    for (index, row) in rows.iter().enumerate() {
        let row_y = y + TABLE_TITLE_HEIGHT + TABLE_ROW_HEIGHT * (index as f32 + 1.0);
        draw_row_band(canvas, index, row_y);
        canvas.left_text(&row.label, MARGIN_LEFT + 10.0, row_y + 5.0, 9.0, Font::Bold, Palette::text_dark());
        canvas.left_text(&row.value, value_x, row_y + 5.0, 9.0, Font::Regular, Palette::text_dark());
        canvas.left_text(&row.status, status_x, row_y + 5.0, 8.0, Font::Bold, row.status_color);
    }
}

fn draw_card(canvas: &mut Canvas, x: f32, y: f32, width: f32, heading: &str) {
    canvas.fill_and_stroke_rect(
        (x, y, width, HEALTH_CARD_HEIGHT),
        Palette::light_green(),
        Palette::primary(),
        1.0,
    );
    canvas.left_text(heading, x + 10.0, y + 10.0, 10.0, Font::Bold, Palette::primary());
}

fn draw_health_card(canvas: &mut Canvas, card: &HealthCard, x: f32, y: f32, width: f32) {
    draw_card(canvas, x, y, width, "SOIL HEALTH");

    canvas.fill_circle(x + 14.0, y + 32.0, 4.0, card.color);
    canvas.left_text(&card.health, x + 24.0, y + 28.0, 11.0, Font::Bold, card.color);

    canvas.left_text("Fertility Rating", x + 10.0, y + 50.0, 8.0, Font::Regular, Palette::text_light());
    let rating = format!("{:.1}", card.fertility);
    canvas.left_text(&rating, x + 10.0, y + 63.0, 28.0, Font::Bold, card.color);
    canvas.left_text("/10", x + 55.0, y + 75.0, 12.0, Font::Regular, Palette::text_light());

    let bar_x = x + 90.0;
    let bar_width = width - 100.0;
    let progress = (card.fertility / 10.0).clamp(0.0, 1.0) as f32;
    canvas.fill_rect(bar_x, y + 80.0, bar_width, 6.0, Palette::border());
    if progress > 0.0 {
        canvas.fill_rect(bar_x, y + 80.0, bar_width * progress, 6.0, card.color);
    }
}

fn draw_crop_card(canvas: &mut Canvas, card: &CropCard, x: f32, y: f32, width: f32) {
    draw_card(canvas, x, y, width, "RECOMMENDED");
    let inner = width - 20.0;

    let name = fit_text(&card.name, inner, 13.0, Font::Bold);
    canvas.left_text(&name, x + 10.0, y + 28.0, 13.0, Font::Bold, Palette::dark_green());

    let score = format!("Match Score: {:.0}%", card.match_score.round());
    canvas.left_text(&score, x + 10.0, y + 48.0, 8.0, Font::Regular, Palette::text_dark());

    let fertilizer = fit_text(&format!("Fertilizer: {}", card.fertilizer), inner, 8.0, Font::Regular);
    canvas.left_text(&fertilizer, x + 10.0, y + 62.0, 8.0, Font::Regular, Palette::text_dark());

    if card.alternatives.is_empty() {
        return;
    }
    canvas.left_text("Alternatives:", x + 10.0, y + 80.0, 7.0, Font::Bold, Palette::text_dark());
    for (i, (alt, alt_score)) in card.alternatives.iter().take(3).enumerate() {
        let line = format!("{}. {alt} ({:.0}%)", i + 1, alt_score.round());
        let line = fit_text(&line, inner, 7.0, Font::Regular);
        canvas.left_text(
            &line,
            x + 10.0,
            y + 90.0 + 8.0 * i as f32,
            7.0,
            Font::Regular,
            Palette::text_light(),
        );
    }
}

fn draw_cover(canvas: &mut Canvas, cover: &Cover, logo: Option<(u32, u32)>) {
    let (band_x, band_w) = (50.0, PAGE_WIDTH - 100.0);
    canvas.fill_rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, Palette::light_green());

    match logo {
        Some(size) => draw_logo(canvas, size, 222.5, 200.0, 150.0, 120.0),
        None => canvas.text(
            PLATFORM_NAME,
            band_x,
            240.0,
            band_w,
            Align::Center,
            32.0,
            Font::Bold,
            Palette::primary(),
        ),
    }

    let centered = |canvas: &mut Canvas, text: &str, y: f32, size: f32, font: Font, color: Color| {
        canvas.text(text, band_x, y, band_w, Align::Center, size, font, color);
    };
    centered(canvas, &cover.title, 380.0, 24.0, Font::Bold, Palette::primary());
    centered(canvas, &cover.subtitle, 410.0, 18.0, Font::Regular, Palette::dark_green());

    let (box_x, box_w) = (120.0, 355.0);
    canvas.fill_and_stroke_rect((box_x, 480.0, box_w, 100.0), Palette::white(), Palette::primary(), 2.0);
    let boxed = |canvas: &mut Canvas, text: &str, y: f32, size: f32, font: Font, color: Color| {
        let text = fit_text(text, box_w - 20.0, size, font);
        canvas.text(&text, box_x, y, box_w, Align::Center, size, font, color);
    };
    boxed(canvas, &cover.farmer_name, 500.0, 16.0, Font::Bold, Palette::text_dark());
    boxed(canvas, &cover.location, 530.0, 12.0, Font::Regular, Palette::text_light());
    boxed(
        canvas,
        &format!("Total Reports: {}", cover.total_reports),
        555.0,
        11.0,
        Font::Regular,
        Palette::primary(),
    );
}

fn draw_footer(canvas: &mut Canvas, index: usize, total: usize, generated_on: &str) {
    canvas.line((MARGIN_LEFT, FOOTER_RULE_Y), (RIGHT_EDGE, FOOTER_RULE_Y), Palette::border(), 0.5);
    let text_y = FOOTER_RULE_Y + 10.0;
    canvas.left_text(
        &format!("{FOOTER_BRAND} | Generated: {generated_on}"),
        MARGIN_LEFT,
        text_y,
        8.0,
        Font::Regular,
        Palette::text_light(),
    );
    canvas.text(
        &page_label(index, total),
        450.0,
        text_y,
        RIGHT_EDGE - 450.0,
        Align::Right,
        8.0,
        Font::Regular,
        Palette::text_light(),
    );
}
