//! SVG drawing for the dashboard's charts
//!
//! Every chart is rendered with plotters into a self-contained `<svg>` string.
//! Charts given no data still draw their title, with a "No data" placeholder
//! underneath.

use std::f64::consts::{FRAC_PI_2, TAU};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::{
    errors::Error,
    types::{DailyOrders, MapPoint, OnTimeSlice, StateCount},
};

const FONT: &str = "sans-serif";
/// Stroke colour of the daily trend line
const TREND_COLOUR: RGBColor = RGBColor(0x90, 0xCA, 0xF9);
const BAR_COLOUR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const MAP_COLOUR: RGBColor = RGBColor(0xff, 0x4b, 0x4b);
const MAX_X_LABELS: usize = 8;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Escapes text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Runs `draw` against an SVG backend of `size` pixels and returns the markup
fn draw_svg<F>(size: (u32, u32), draw: F) -> Result<String, Error>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
{
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        paint(&root, draw).map_err(|err| Error::Chart(err.to_string()))?;
    }
    Ok(buffer)
}

fn paint<F>(root: &DrawingArea<SVGBackend<'_>, Shift>, draw: F) -> DrawResult
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
{
    root.fill(&WHITE)?;
    draw(root)?;
    root.present()?;
    Ok(())
}

/// Title plus a centred "No data" message
fn no_data(root: &DrawingArea<SVGBackend<'_>, Shift>, title: &str) -> DrawResult {
    let area = root.titled(title, (FONT, 22))?;
    let (width, height) = area.dim_in_pixel();
    let style = (FONT, 20)
        .into_font()
        .color(&BLACK.mix(0.4))
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        "No data",
        (width as i32 / 2, height as i32 / 2),
        style,
    ))?;
    Ok(())
}

/// Line chart of distinct orders per day, with a marker on every day.
///
/// Days are spaced by their distance in time, so gaps in the data stay visible.
pub fn line_chart(daily: &[DailyOrders]) -> Result<String, Error> {
    draw_svg((900, 420), |root| {
        let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
            return no_data(root, "Daily Orders");
        };
        let x_range = if daily.len() == 1 {
            -1..1
        } else {
            0..(last.day - first.day).num_days()
        };
        let largest = daily.iter().map(|day| day.order_count).max().unwrap_or(0);

        let mut chart = ChartBuilder::on(root)
            .caption("Daily Orders", (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0u64..largest as u64 + 1)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(MAX_X_LABELS)
            .x_label_formatter(&|offset: &i64| {
                (first.day + chrono::Duration::days(*offset))
                    .format("%Y-%m-%d")
                    .to_string()
            })
            .y_desc("Orders")
            .draw()?;

        let points: Vec<(i64, u64)> = daily
            .iter()
            .map(|entry| {
                (
                    (entry.day - first.day).num_days(),
                    entry.order_count as u64,
                )
            })
            .collect();
        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            TREND_COLOUR.stroke_width(2),
        ))?;
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 4, TREND_COLOUR.filled())),
        )?;
        Ok(())
    })
}

/// Bar chart with one bar per customer state, in the order given
pub fn bar_chart(states: &[StateCount]) -> Result<String, Error> {
    const TITLE: &str = "Number of Customers by State";
    draw_svg((900, 440), |root| {
        if states.is_empty() {
            return no_data(root, TITLE);
        }
        let largest = states.iter().map(|state| state.customers).max().unwrap_or(0);

        let mut chart = ChartBuilder::on(root)
            .caption(TITLE, (FONT, 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(
                (0u32..states.len() as u32).into_segmented(),
                0u64..largest as u64 + 1,
            )?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(states.len())
            .x_label_formatter(&|segment: &SegmentValue<u32>| match segment {
                SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => states
                    .get(*i as usize)
                    .map(|state| state.state.clone())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .x_desc("State")
            .y_desc("Number of Customers")
            .draw()?;

        chart.draw_series(states.iter().enumerate().map(|(i, state)| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0),
                    (SegmentValue::Exact(i + 1), state.customers as u64),
                ],
                BAR_COLOUR.filled(),
            );
            bar.set_margin(0, 0, 6, 6);
            bar
        }))?;
        Ok(())
    })
}

/// Pie chart of the on-time flag, starting at twelve o'clock and running
/// anticlockwise, each slice labelled with its share
pub fn pie_chart(slices: &[OnTimeSlice]) -> Result<String, Error> {
    const TITLE: &str = "Delivery On Time Ratio";
    draw_svg((500, 440), |root| {
        let total: usize = slices.iter().map(|slice| slice.rows).sum();
        if total == 0 {
            return no_data(root, TITLE);
        }
        let area = root.titled(TITLE, (FONT, 22))?;
        let (width, height) = area.dim_in_pixel();
        let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
        let radius = f64::from(width.min(height)) * 0.35;
        let point = |angle: f64, distance: f64| {
            (
                (cx + distance * angle.cos()).round() as i32,
                (cy - distance * angle.sin()).round() as i32,
            )
        };
        let centred = |size: u32| {
            TextStyle::from((FONT, size).into_font()).pos(Pos::new(HPos::Center, VPos::Center))
        };

        let mut start = FRAC_PI_2;
        for (i, slice) in slices.iter().enumerate() {
            let sweep = TAU * slice.rows as f64 / total as f64;
            let steps = ((sweep / TAU) * 180.0).ceil().max(2.0) as usize;
            let mut outline = vec![point(0.0, 0.0)];
            outline.extend(
                (0..=steps).map(|step| point(start + sweep * step as f64 / steps as f64, radius)),
            );
            area.draw(&Polygon::new(outline, Palette99::pick(i).filled()))?;

            let middle = start + sweep / 2.0;
            area.draw(&Text::new(
                slice.label.clone(),
                point(middle, radius * 1.15),
                centred(15),
            ))?;
            area.draw(&Text::new(
                format!("{}%", slice.percentage),
                point(middle, radius * 0.6),
                centred(14),
            ))?;
            start += sweep;
        }
        Ok(())
    })
}

/// Scatter of customer locations, longitude across and latitude up, fitted
/// to the points' bounding box
pub fn scatter_map(points: &[MapPoint]) -> Result<String, Error> {
    const TITLE: &str = "Order Locations";
    draw_svg((900, 560), |root| {
        if points.is_empty() {
            return no_data(root, TITLE);
        }
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);
        for point in points {
            min_lat = min_lat.min(point.latitude);
            max_lat = max_lat.max(point.latitude);
            min_lng = min_lng.min(point.longitude);
            max_lng = max_lng.max(point.longitude);
        }
        let pad = 0.5;

        let mut chart = ChartBuilder::on(root)
            .caption(TITLE, (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(
                (min_lng - pad)..(max_lng + pad),
                (min_lat - pad)..(max_lat + pad),
            )?;
        chart
            .configure_mesh()
            .x_desc("Longitude")
            .y_desc("Latitude")
            .draw()?;
        chart.draw_series(points.iter().map(|point| {
            Circle::new(
                (point.longitude, point.latitude),
                3,
                MAP_COLOUR.mix(0.7).filled(),
            )
        }))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    fn daily(d: u32, order_count: usize) -> DailyOrders {
        DailyOrders {
            day: NaiveDate::from_ymd_opt(2018, 1, d).unwrap(),
            order_count,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_line_chart_marks_every_day() {
        let svg = line_chart(&[daily(1, 1), daily(2, 4), daily(5, 2)]).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Daily Orders"));
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn test_single_day_line_chart() {
        let svg = line_chart(&[daily(3, 7)]).unwrap();
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(!svg.contains("No data"));
    }

    #[test]
    fn test_empty_charts_show_placeholder() {
        let charts = [
            line_chart(&[]).unwrap(),
            bar_chart(&[]).unwrap(),
            pie_chart(&[]).unwrap(),
            scatter_map(&[]).unwrap(),
        ];
        for svg in charts {
            assert!(svg.contains("No data"));
            assert!(!svg.contains("<circle"));
            assert!(!svg.contains("<polygon"));
        }
    }

    #[test]
    fn test_bar_chart_keeps_order_and_escapes() {
        let svg = bar_chart(&[
            StateCount {
                state: "SP".to_owned(),
                customers: 5,
            },
            StateCount {
                state: "<RJ>".to_owned(),
                customers: 2,
            },
        ])
        .unwrap();
        assert!(svg.contains("Number of Customers by State"));
        assert!(svg.contains("&lt;RJ&gt;"));
        assert!(!svg.contains("<RJ>"));
        assert!(svg.find("SP").unwrap() < svg.find("&lt;RJ&gt;").unwrap());
    }

    #[test]
    fn test_pie_chart_labels_percentages() {
        let svg = pie_chart(&[
            OnTimeSlice {
                label: "True".to_owned(),
                rows: 2,
                percentage: dec!(66.7),
            },
            OnTimeSlice {
                label: "False".to_owned(),
                rows: 1,
                percentage: dec!(33.3),
            },
        ])
        .unwrap();
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains("66.7%"));
        assert!(svg.contains("33.3%"));
        assert!(svg.contains("True"));
    }

    #[test]
    fn test_single_slice_fills_the_pie() {
        let svg = pie_chart(&[OnTimeSlice {
            label: "True".to_owned(),
            rows: 4,
            percentage: dec!(100.0),
        }])
        .unwrap();
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert!(svg.contains("100.0%"));
    }

    #[test]
    fn test_scatter_map_plots_each_point() {
        let svg = scatter_map(&[
            MapPoint {
                latitude: -23.5,
                longitude: -46.6,
            },
            MapPoint {
                latitude: -22.9,
                longitude: -43.2,
            },
            MapPoint {
                latitude: -23.5,
                longitude: -46.6,
            },
        ])
        .unwrap();
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(!svg.contains("NaN"));
    }
}
