use std::path::PathBuf;

/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reading CSV data; could wrap IO or parsing errors, including bad timestamps
    #[error("Error processing order data: {0}")]
    Load(#[from] csv::Error),
    /// The order data file could not be opened
    #[error("Couldn't open order data at {}: {source}", path.display())]
    Open {
        /// Path that was tried
        path: PathBuf,
        /// Underlying IO failure
        source: std::io::Error,
    },
    /// A column the dashboard depends on is not in the header
    #[error("Order data is missing required column {0:?}")]
    MissingColumn(&'static str),
    /// The file has a header but no rows, so there is no date range to offer
    #[error("Order data contains no orders")]
    NoOrders,
    /// A chart could not be drawn
    #[error("Couldn't draw chart: {0}")]
    Chart(String),
}
