use thiserror::Error;
use uuid::Uuid;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Analysis {analysis_id} cannot be rendered: missing {missing}")]
    IncompleteAnalysis {
        analysis_id: Uuid,
        missing: &'static str,
    },

    #[error("No analyses to render")]
    NoAnalyses,

    #[error("PDF encoding error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
