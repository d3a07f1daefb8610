use thiserror::Error;

/// Failure modes of a single dashboard render.
///
/// The first three are user-recoverable: they short-circuit only the visual
/// section that hit them and are shown as plain warnings. The rest are fatal
/// for the load that raised them.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Please select at least one date.")]
    EmptyDateSelection,

    #[error("No SLA data for the selected dates.")]
    NoSlaData,

    #[error("No data for selected outlets.")]
    NoDataForOutlets,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart render failed: {0}")]
    Render(String),
}
