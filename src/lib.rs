#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// SVG drawing for each chart
pub mod charts;
/// Environment-driven settings
pub mod config;
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Functions for reading the order data file
pub mod io;
/// Filtering and aggregation over the order table
pub mod ops;
/// HTML layout of the dashboard
pub mod page;
/// The filter-aggregate-draw pipeline for one date range
pub mod render;
/// Data types used throughout the dashboard
pub mod types;
