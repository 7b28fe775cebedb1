//! Plain-text rendering of a timeline.
//!
//! One row per bucket followed by a totals row, columns right-aligned to the
//! widest cell.

use timeline_core::formatting::format_count;
use timeline_core::models::{ActivityTimeline, Category, TimelineBucket};

const DATE_HEADER: &str = "Date";
const TOTAL_HEADER: &str = "Events";
const TOTAL_LABEL: &str = "Total";

fn header_cells() -> Vec<String> {
    let mut cells = vec![DATE_HEADER.to_string()];
    cells.extend(Category::ALL.iter().map(|c| c.label().to_string()));
    cells.push(TOTAL_HEADER.to_string());
    cells
}

fn bucket_cells(label: &str, bucket: &TimelineBucket) -> Vec<String> {
    let mut cells = vec![label.to_string()];
    cells.extend(Category::ALL.iter().map(|c| format_count(bucket.count(*c))));
    cells.push(format_count(bucket.n_events));
    cells
}

/// Render `timeline` as an aligned text table with a trailing totals row.
pub fn render_table(timeline: &ActivityTimeline) -> String {
    if timeline.is_empty() {
        return "No activity inside the selected window.\n".to_string();
    }

    let mut rows: Vec<Vec<String>> = vec![header_cells()];
    rows.extend(timeline.iter().map(|(key, bucket)| bucket_cells(key, bucket)));
    let totals = bucket_cells(TOTAL_LABEL, &timeline.totals());

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .chain(std::iter::once(&totals))
                .map(|r| r[i].len())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut out = String::new();
    for (index, row) in rows.iter().enumerate() {
        out.push_str(&format_row(row, &widths));
        if index == 0 {
            out.push_str(&separator);
            out.push('\n');
        }
    }
    out.push_str(&separator);
    out.push('\n');
    out.push_str(&format_row(&totals, &widths));
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            if i == 0 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{}\n", line.trim_end())
}
