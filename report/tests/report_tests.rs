//! Structural tests for report layouts and the generated PDF

use chrono::{TimeZone, Utc};
use lopdf::Document;
use proptest::prelude::*;
use report::layout::{paginate, Row, Section, SectionKind};
use lopdf::Object;
use report::{
    load_logo, multi_report_layout, render_multi, render_single, single_report_layout,
    FarmerHeading, LogoImage, RenderContext, RenderError,
};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use shared::{
    AlternativeCrop, BoundaryGeometry, ClimateData, CropRecommendation, DataSource, FarmSize,
    PrimaryCrop, Season, SoilAnalysis, SoilHealth, SoilProperties, SoilSample, SoilTexture,
};
use uuid::Uuid;

fn farmer() -> FarmerHeading {
    FarmerHeading {
        full_name: "Ravi Patil".to_string(),
        location: "Baramati, Pune".to_string(),
        farm_size: FarmSize::Medium,
    }
}

fn analysis() -> SoilAnalysis {
    let boundary = BoundaryGeometry::from_coordinates(vec![
        [73.8567, 18.5204],
        [73.8577, 18.5204],
        [73.8577, 18.5214],
        [73.8567, 18.5214],
        [73.8567, 18.5204],
    ])
    .unwrap();
    let date = Utc.with_ymd_and_hms(2024, 7, 15, 9, 30, 0).unwrap();
    SoilAnalysis {
        id: Uuid::new_v4(),
        farmer_id: Uuid::new_v4(),
        boundary,
        sample: SoilSample {
            soil_properties: SoilProperties {
                ph: 6.8,
                nitrogen: 0.25,
                phosphorus: 42.0,
                potassium: 190.0,
                organic_carbon: 21.0,
                clay: 38.0,
                sand: None,
                bulk_density: Some(1.35),
                cec: None,
                soil_type: SoilTexture::ClayLoam,
            },
            climate_data: ClimateData {
                rainfall: 850.0,
                temperature: 26.5,
            },
        },
        soil_color: None,
        crop_recommendation: CropRecommendation {
            primary_crop: PrimaryCrop {
                name: "Sugarcane".to_string(),
                match_score: 92.0,
                fertilizer: "NPK 250:115:115 kg/ha".to_string(),
            },
            alternative_crops: vec![
                AlternativeCrop { name: "Cotton".to_string(), match_score: 85.0 },
                AlternativeCrop { name: "Soybean".to_string(), match_score: 80.5 },
                AlternativeCrop { name: "Wheat".to_string(), match_score: 72.0 },
                AlternativeCrop { name: "Gram".to_string(), match_score: 60.0 },
            ],
        },
        soil_health: SoilHealth::Excellent,
        fertility_rating: 7.5,
        analysis_date: date,
        season: Season::Kharif,
        data_source: DataSource::SoilGrids,
        notes: None,
        is_archived: false,
        report_viewed: false,
        report_downloaded: false,
        download_count: 0,
        created_at: date,
        updated_at: date,
    }
}

fn ctx() -> RenderContext {
    RenderContext::new(Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap())
}

fn table_rows<'a>(layout: &'a report::ReportLayout, title: &str) -> &'a [Row] {
    layout
        .sections()
        .find_map(|s| match s {
            Section::Table { title: t, rows } if t == title => Some(rows.as_slice()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no table titled {title}"))
}

fn value<'a>(rows: &'a [Row], label: &str) -> &'a str {
    rows.iter()
        .find(|r| r.label == label)
        .map(|r| r.value.as_str())
        .unwrap_or_else(|| panic!("no row {label}"))
}

// ============================================================================
// Single report
// ============================================================================

#[test]
fn test_single_report_section_order() {
    let layout = single_report_layout(&farmer(), &analysis()).unwrap();
    assert_eq!(
        layout.section_kinds(),
        vec![
            SectionKind::Header,
            SectionKind::Table,
            SectionKind::Table,
            SectionKind::Table,
            SectionKind::Nutrients,
            SectionKind::Table,
            SectionKind::HealthAndCrops,
        ]
    );
    assert_eq!(
        layout.titles(),
        vec![
            "SOIL ANALYSIS REPORT",
            "FARMER INFORMATION",
            "FARM BOUNDARY DETAILS",
            "SOIL PROPERTIES ANALYSIS",
            "NPK ANALYSIS",
            "CLIMATE CONDITIONS",
        ]
    );
}

#[test]
fn test_single_report_fits_one_page() {
    let layout = single_report_layout(&farmer(), &analysis()).unwrap();
    let pages = paginate(&layout);
    assert_eq!(pages.len(), 1);
    assert!(pages[0].bottom() <= report::style::CONTENT_BOTTOM);
}

#[test]
fn test_single_report_table_values() {
    let a = analysis();
    let layout = single_report_layout(&farmer(), &a).unwrap();

    let info = table_rows(&layout, "FARMER INFORMATION");
    assert_eq!(info.len(), 5);
    assert_eq!(value(info, "Farmer Name"), "Ravi Patil");
    assert_eq!(value(info, "Farm Size"), FarmSize::Medium.report_label());
    assert_eq!(value(info, "Analysis Date"), "15 July 2024");
    assert_eq!(value(info, "Season"), "Kharif");

    let boundary = table_rows(&layout, "FARM BOUNDARY DETAILS");
    assert_eq!(value(boundary, "Boundary Points"), "5");
    assert_eq!(value(boundary, "Area"), format!("{:.2} acres", a.boundary.area));
    assert!(value(boundary, "Center Coordinates").ends_with("°E"));

    let soil = table_rows(&layout, "SOIL PROPERTIES ANALYSIS");
    assert_eq!(soil.len(), 6);
    assert_eq!(value(soil, "Soil Type"), "Clay Loam");
    assert_eq!(value(soil, "pH Level"), "6.80");
    assert_eq!(value(soil, "Clay Content"), "38.0%");
    assert_eq!(value(soil, "Sand Content"), "N/A");
    assert_eq!(value(soil, "Bulk Density"), "1.35 g/cm³");

    let climate = table_rows(&layout, "CLIMATE CONDITIONS");
    assert_eq!(value(climate, "Average Rainfall"), "850 mm");
    assert_eq!(value(climate, "Average Temperature"), "26.5°C");
}

#[test]
fn test_nutrient_rows_carry_status() {
    let layout = single_report_layout(&farmer(), &analysis()).unwrap();
    let rows = layout
        .sections()
        .find_map(|s| match s {
            Section::Nutrients { rows, .. } => Some(rows.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].label, "Nitrogen (N)");
    assert_eq!(rows[0].value, "0.25 kg/ha");
    assert_eq!(rows[0].status, "Low");
    assert_eq!(rows[1].value, "42 kg/ha");
    assert_eq!(rows[1].status, "Medium");
    assert_eq!(rows[2].status, "Good");
}

#[test]
fn test_crop_card_caps_alternatives() {
    let layout = single_report_layout(&farmer(), &analysis()).unwrap();
    let Some(Section::HealthAndCrops { health, crop }) = layout.sections().last() else {
        panic!("last section should be the health block");
    };
    assert_eq!(health.health, "Excellent");
    assert_eq!(crop.name, "Sugarcane");
    assert_eq!(crop.alternatives.len(), 3);
    assert_eq!(crop.alternatives[0].0, "Cotton");
}

#[test]
fn test_single_pdf_has_one_page() {
    let a = analysis();
    let rendered = render_single(&ctx(), &farmer(), &a).unwrap();
    assert_eq!(rendered.filename, format!("soil-analysis-{}.pdf", a.id));
    assert_eq!(rendered.content_type(), "application/pdf");
    assert!(rendered.bytes.starts_with(b"%PDF-"));
    let doc = Document::load_mem(&rendered.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_rendering_is_deterministic() {
    let a = analysis();
    let first = render_single(&ctx(), &farmer(), &a).unwrap();
    let second = render_single(&ctx(), &farmer(), &a).unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn test_missing_primary_crop_is_rejected() {
    let mut a = analysis();
    a.crop_recommendation.primary_crop.name = "  ".to_string();
    let err = render_single(&ctx(), &farmer(), &a).unwrap_err();
    assert!(matches!(
        err,
        RenderError::IncompleteAnalysis { missing: "primary crop", .. }
    ));
}

#[test]
fn test_non_finite_measurement_is_rejected() {
    let mut a = analysis();
    a.sample.soil_properties.ph = f64::NAN;
    assert!(matches!(
        single_report_layout(&farmer(), &a),
        Err(RenderError::IncompleteAnalysis { .. })
    ));
}

// ============================================================================
// Compilation report
// ============================================================================

#[test]
fn test_multi_report_needs_analyses() {
    assert!(matches!(
        render_multi(&ctx(), &farmer(), &[]),
        Err(RenderError::NoAnalyses)
    ));
}

#[test]
fn test_multi_report_cover_and_headers() {
    let analyses = vec![analysis(), analysis(), analysis()];
    let layout = multi_report_layout(&farmer(), &analyses).unwrap();

    let first = layout.sections().next().unwrap();
    let Section::Cover(cover) = first else {
        panic!("compilation must open with a cover");
    };
    assert_eq!(cover.total_reports, 3);
    assert_eq!(cover.farmer_name, "Ravi Patil");

    let headers: Vec<&str> = layout
        .sections()
        .filter(|s| s.kind() == SectionKind::Header)
        .filter_map(Section::title)
        .collect();
    assert_eq!(
        headers,
        vec![
            "SOIL ANALYSIS REPORT - 1/3",
            "SOIL ANALYSIS REPORT - 2/3",
            "SOIL ANALYSIS REPORT - 3/3",
        ]
    );

    let info = table_rows(&layout, "BASIC INFORMATION");
    assert_eq!(value(info, "Date"), "15/7/2024");
}

#[test]
fn test_multi_report_one_page_per_analysis() {
    let analyses = vec![analysis(), analysis()];
    let layout = multi_report_layout(&farmer(), &analyses).unwrap();
    let pages = paginate(&layout);
    assert_eq!(pages.len(), 3);
    assert!(pages[0].is_cover());
    assert!(pages[1..].iter().all(|p| !p.is_cover() && p.sections.len() == 4));
}

#[test]
fn test_multi_pdf_page_count_and_filename() {
    let analyses = vec![analysis(), analysis()];
    let rendered = render_multi(&ctx(), &farmer(), &analyses).unwrap();
    let doc = Document::load_mem(&rendered.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    assert!(rendered.filename.starts_with("all-soil-reports-"));
    assert!(rendered.filename.ends_with(".pdf"));
}

#[test]
fn test_one_bad_analysis_fails_the_compilation() {
    let mut bad = analysis();
    bad.fertility_rating = f64::INFINITY;
    let analyses = vec![analysis(), bad];
    assert!(render_multi(&ctx(), &farmer(), &analyses).is_err());
}

// ============================================================================
// Drawn text
// ============================================================================

/// Every string shown with `Tj` on the given page
fn page_strings(bytes: &[u8], page: u32) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = doc.get_pages()[&page];
    let content = doc.get_and_decode_page_content(page_id).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_match_scores_are_whole_percentages() {
    let mut a = analysis();
    a.crop_recommendation.primary_crop.match_score = 87.333333;
    let rendered = render_single(&ctx(), &farmer(), &a).unwrap();
    let strings = page_strings(&rendered.bytes, 1);

    assert!(strings.iter().any(|s| s == "Match Score: 87%"), "{strings:?}");
    assert!(strings.iter().any(|s| s == "2. Soybean (81%)"), "{strings:?}");
    assert!(!strings.iter().any(|s| s.contains("87.3")));
}

// ============================================================================
// Logo
// ============================================================================

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("soily-{}-{}", Uuid::new_v4(), name))
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([37, 153, 92]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[test]
fn test_missing_logo_file_falls_back() {
    assert!(load_logo(&temp_path("absent.png")).is_none());
}

#[test]
fn test_undecodable_logo_falls_back() {
    let path = temp_path("broken.png");
    std::fs::write(&path, b"definitely not an image").unwrap();
    let logo = load_logo(&path);
    std::fs::remove_file(&path).ok();

    assert!(logo.is_none());
    assert!(LogoImage::from_bytes(b"%PDF-1.5").is_err());
}

#[test]
fn test_logo_loaded_from_disk() {
    let path = temp_path("logo.png");
    std::fs::write(&path, png_bytes(8, 4)).unwrap();
    let logo = load_logo(&path);
    std::fs::remove_file(&path).ok();

    let logo = logo.expect("png should decode");
    assert_eq!((logo.width, logo.height), (8, 4));
    assert_eq!(logo.rgb.len(), 8 * 4 * 3);
}

#[test]
fn test_render_with_logo_embeds_one_page() {
    let logo = LogoImage::from_bytes(&png_bytes(12, 6)).unwrap();
    let ctx = ctx().with_logo(Some(Arc::new(logo)));
    let rendered = render_single(&ctx, &farmer(), &analysis()).unwrap();

    let doc = Document::load_mem(&rendered.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let page_id = doc.get_pages()[&1];
    let content = doc.get_and_decode_page_content(page_id).unwrap();
    assert!(content.operations.iter().any(|op| op.operator == "Do"));
    // The placeholder box text is only drawn without a logo
    assert!(!page_strings(&rendered.bytes, 1).iter().any(|s| s == "SOILY"));
}

#[test]
fn test_render_without_logo_draws_placeholder() {
    let rendered = render_single(&ctx(), &farmer(), &analysis()).unwrap();
    assert!(page_strings(&rendered.bytes, 1).iter().any(|s| s == "SOILY"));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_compilation_pages_equal_analyses_plus_cover(count in 1usize..12) {
        let analyses: Vec<SoilAnalysis> = (0..count).map(|_| analysis()).collect();
        let layout = multi_report_layout(&farmer(), &analyses).unwrap();
        prop_assert_eq!(paginate(&layout).len(), count + 1);
    }

    #[test]
    fn prop_single_layout_never_overflows(
        ph in 0.0f64..14.0,
        nitrogen in 0.0f64..5.0,
        potassium in 0.0f64..500.0,
        name in "[A-Za-z ]{1,80}",
    ) {
        let mut a = analysis();
        a.sample.soil_properties.ph = ph;
        a.sample.soil_properties.nitrogen = nitrogen;
        a.sample.soil_properties.potassium = potassium;
        let f = FarmerHeading { full_name: name, ..farmer() };
        let layout = single_report_layout(&f, &a).unwrap();
        let pages = paginate(&layout);
        prop_assert!(pages.iter().all(report::layout::fits_page));
    }
}
