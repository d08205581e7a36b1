//! HTML layout of the dashboard page

use std::path::Path;

use crate::{charts::escape, render::RenderedArtifacts};

/// What the sidebar shows in place of the logo
#[derive(Debug, Clone, Copy)]
pub enum Logo<'a> {
    /// The image exists and is served at `src`
    Available {
        /// URL of the image
        src: &'a str,
    },
    /// The configured image file was not found
    Missing(&'a Path),
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; color: #262730; }
aside { width: 260px; min-height: 100vh; padding: 1.5rem; background: #f0f2f6; box-sizing: border-box; }
aside img { max-width: 100%; }
main { flex: 1; padding: 1.5rem 3rem; max-width: 1000px; }
.metric .label { font-size: 0.9rem; }
.metric .value { font-size: 2.2rem; }
.error, .warning { padding: 0.8rem 1rem; border-radius: 0.4rem; margin: 0.5rem 0; }
.error { background: #ffe0e0; color: #7d1a1a; }
.warning { background: #fff6d6; color: #6b5200; }
main svg { max-width: 100%; height: auto; }
footer { color: #808495; font-size: 0.8rem; margin-top: 2rem; }
"#;

/// Lays out the whole dashboard: sidebar with logo and date picker, then the
/// metric and every chart from top to bottom.
pub fn dashboard_page(artifacts: &RenderedArtifacts, logo: Logo<'_>) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>E-Commerce Dashboard</title>\n");
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    html.push_str("<aside>\n");
    match logo {
        Logo::Available { src } => {
            html.push_str(&format!("<img src=\"{}\" alt=\"logo\">\n", escape(src)));
        }
        Logo::Missing(path) => {
            html.push_str(&format!(
                "<div class=\"error\">Logo not found: {}</div>\n",
                escape(&path.display().to_string())
            ));
        }
    }
    html.push_str(&date_form(artifacts));
    html.push_str("</aside>\n");

    html.push_str("<main>\n<h1>E-Commerce Dashboard</h1>\n");
    for warning in &artifacts.warnings {
        html.push_str(&format!(
            "<div class=\"warning\">{}</div>\n",
            escape(warning)
        ));
    }

    html.push_str("<h2>Daily Orders</h2>\n");
    html.push_str(&format!(
        "<div class=\"metric\"><div class=\"label\">Total orders</div><div class=\"value\">{}</div></div>\n",
        artifacts.total_orders
    ));

    html.push_str("<h2>Order Trend</h2>\n");
    html.push_str(&artifacts.daily_trend);

    html.push_str("\n<h2>Order Map</h2>\n");
    html.push_str(&artifacts.order_map);

    html.push_str("\n<h2>Number of Customers by State</h2>\n");
    html.push_str(&artifacts.state_bars);

    html.push_str("\n<h2>Delivery On Time Ratio</h2>\n");
    match (&artifacts.on_time_pie, &artifacts.on_time_warning) {
        (Some(pie), _) => html.push_str(pie),
        (None, Some(warning)) => html.push_str(&format!(
            "<div class=\"warning\">{}</div>\n",
            escape(warning)
        )),
        (None, None) => {}
    }

    html.push_str(&format!(
        "\n<footer>Orders purchased between {} and {}</footer>\n</main>\n</body>\n</html>\n",
        artifacts.bounds.start, artifacts.bounds.end
    ));
    html
}

/// The date-range picker, bounded by the dataset's first and last purchase dates
fn date_form(artifacts: &RenderedArtifacts) -> String {
    let (min, max) = (artifacts.bounds.start, artifacts.bounds.end);
    format!(
        "<h2>Filter by Date</h2>\n\
         <form method=\"get\" action=\"/\">\n\
         <label>Start <input type=\"date\" name=\"start\" min=\"{min}\" max=\"{max}\" value=\"{}\"></label><br>\n\
         <label>End <input type=\"date\" name=\"end\" min=\"{min}\" max=\"{max}\" value=\"{}\"></label><br>\n\
         <button type=\"submit\">Apply</button>\n\
         </form>\n",
        artifacts.range.start, artifacts.range.end
    )
}
