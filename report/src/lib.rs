//! PDF soil reports for the SOILY platform
//!
//! Rendering happens in two steps. [`compose`] builds a declarative
//! [`ReportLayout`] from the domain models, then the layout is paginated and
//! painted with lopdf. Both steps are pure and synchronous; callers on an
//! async runtime should run them on a blocking thread.

pub mod compose;
pub mod draw;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod style;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::SoilAnalysis;

pub use compose::{format_short_date, multi_report_layout, single_report_layout, FarmerHeading};
pub use error::{RenderError, RenderResult};
pub use layout::{paginate, ReportLayout, Section, SectionKind};
pub use pdf::LogoImage;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Per-render inputs that do not come from the analysis
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub generated_at: DateTime<Utc>,
    pub logo: Option<Arc<LogoImage>>,
}

impl RenderContext {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            logo: None,
        }
    }

    pub fn with_logo(mut self, logo: Option<Arc<LogoImage>>) -> Self {
        self.logo = logo;
        self
    }
}

/// Load a logo once at startup. A missing or unreadable file only means
/// reports fall back to the drawn placeholder.
pub fn load_logo(path: &Path) -> Option<Arc<LogoImage>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Report logo {} not readable: {}", path.display(), e);
            return None;
        }
    };
    match LogoImage::from_bytes(&bytes) {
        Ok(logo) => {
            tracing::info!(
                "Loaded report logo {} ({}x{})",
                path.display(),
                logo.width,
                logo.height
            );
            Some(Arc::new(logo))
        }
        Err(e) => {
            tracing::warn!("Report logo {} could not be decoded: {}", path.display(), e);
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl RenderedReport {
    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }
}

/// Paginate and paint any layout
pub fn render_layout(ctx: &RenderContext, layout: &ReportLayout) -> RenderResult<Vec<u8>> {
    let pages = paginate(layout);
    let generated_on = format_short_date(ctx.generated_at);
    let canvases = draw::draw_pages(
        &pages,
        draw::DrawOptions {
            logo_size: ctx.logo.as_ref().map(|l| (l.width, l.height)),
            generated_on: &generated_on,
        },
    );
    pdf::write_document(canvases, ctx.logo.as_deref())
}

pub fn render_single(
    ctx: &RenderContext,
    farmer: &FarmerHeading,
    analysis: &SoilAnalysis,
) -> RenderResult<RenderedReport> {
    let layout = single_report_layout(farmer, analysis)?;
    let bytes = render_layout(ctx, &layout)?;
    tracing::debug!("Rendered report for analysis {} ({} bytes)", analysis.id, bytes.len());
    Ok(RenderedReport {
        bytes,
        filename: format!("soil-analysis-{}.pdf", analysis.id),
    })
}

pub fn render_multi(
    ctx: &RenderContext,
    farmer: &FarmerHeading,
    analyses: &[SoilAnalysis],
) -> RenderResult<RenderedReport> {
    let layout = multi_report_layout(farmer, analyses)?;
    let bytes = render_layout(ctx, &layout)?;
    tracing::debug!(
        "Rendered compilation of {} analyses ({} bytes)",
        analyses.len(),
        bytes.len()
    );
    Ok(RenderedReport {
        bytes,
        filename: format!("all-soil-reports-{}.pdf", ctx.generated_at.timestamp_millis()),
    })
}
