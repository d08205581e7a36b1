//! One full pass of the dashboard pipeline for a selected date range

use tracing::{debug, warn};

use crate::{
    charts,
    errors::Error,
    ops,
    types::{DailyOrders, Dataset, DateRange},
};

/// Everything drawn on the dashboard for one date range.
///
/// Built fresh on every request; nothing carries over between runs.
#[derive(Debug, Clone)]
pub struct RenderedArtifacts {
    /// The range the data was filtered by
    pub range: DateRange,
    /// First and last purchase dates of the whole dataset
    pub bounds: DateRange,
    /// Distinct orders in the range
    pub total_orders: usize,
    /// Distinct orders per day in the range
    pub daily_orders: Vec<DailyOrders>,
    /// SVG line chart of [`Self::daily_orders`]
    pub daily_trend: String,
    /// SVG scatter of customer locations
    pub order_map: String,
    /// SVG bar chart of rows per customer state
    pub state_bars: String,
    /// SVG pie chart of the on-time flag, when the data has one
    pub on_time_pie: Option<String>,
    /// Why the pie chart was skipped, shown in its place
    pub on_time_warning: Option<String>,
    /// Problems with the selection as a whole, shown above the charts
    pub warnings: Vec<String>,
}

/// Filters `dataset` to `range` and draws every chart.
///
/// A missing on-time column skips the pie chart and leaves a warning in its
/// place. An inverted range, or one that misses the data entirely, yields empty
/// charts and a warning. A chart that fails to draw is left blank with a warning.
pub fn render(dataset: &Dataset, range: DateRange) -> RenderedArtifacts {
    let mut warnings = Vec::new();
    let bounds = dataset.bounds();
    if range.is_inverted() {
        warn!(%range, "start date is after end date");
        warnings.push(format!(
            "Start date {} is after end date {}, so no orders are selected.",
            range.start, range.end
        ));
    } else if !range.overlaps(bounds) {
        warn!(%range, %bounds, "range lies outside the order data");
        warnings.push(format!(
            "No orders between {} and {}; the data covers {} to {}.",
            range.start, range.end, bounds.start, bounds.end
        ));
    }

    let selection = dataset.filter(range);
    let daily_orders = selection.daily_orders();
    let total_orders = ops::total_orders(&daily_orders);
    debug!(
        %range,
        rows = selection.len(),
        days = daily_orders.len(),
        total_orders,
        "filtered orders"
    );

    let (on_time_pie, on_time_warning) =
        match selection.on_time_ratio().and_then(|slices| charts::pie_chart(&slices)) {
            Ok(pie) => (Some(pie), None),
            Err(Error::MissingColumn(column)) => {
                warn!(column, "skipping on-time delivery chart");
                (
                    None,
                    Some(format!("Column '{column}' not found in the order data")),
                )
            }
            Err(err) => {
                warn!(%err, "skipping on-time delivery chart");
                (None, Some(err.to_string()))
            }
        };

    let daily_trend = chart_or_warning(charts::line_chart(&daily_orders), &mut warnings);
    let order_map = chart_or_warning(charts::scatter_map(&selection.map_points()), &mut warnings);
    let state_bars = chart_or_warning(
        charts::bar_chart(&selection.customers_by_state()),
        &mut warnings,
    );

    RenderedArtifacts {
        range,
        bounds,
        total_orders,
        daily_orders,
        daily_trend,
        order_map,
        state_bars,
        on_time_pie,
        on_time_warning,
        warnings,
    }
}

/// Unwraps a drawn chart, or records why it is missing and leaves it blank
fn chart_or_warning(drawn: Result<String, Error>, warnings: &mut Vec<String>) -> String {
    drawn.unwrap_or_else(|err| {
        warn!(%err, "chart not drawn");
        warnings.push(err.to_string());
        String::new()
    })
}
