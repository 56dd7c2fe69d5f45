//! Formatted terminal output for ranked regions.
//!
//! Formatting lives here so the pipeline code stays free of presentation
//! details and output changes stay local.

use crate::domain::{HistoryResult, Kind, MergedRegion};

/// Format the top `top_n` regions under `metric` as a fixed-width table.
pub fn format_rankings(result: &HistoryResult, metric: Kind, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Top {} regions by latest {metric} ({} total):\n",
        top_n.min(result.regions.len()),
        result.regions.len()
    ));
    out.push_str(&format_table(&super::ranked_regions(&result.regions, metric), top_n));

    out
}

fn format_table(rows: &[&MergedRegion], top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>4} {:<28} {:<20} {:>12} {:>10} {:>12}",
            "rank", "region", "country", "confirmed", "deaths", "recovered"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<4} {:-<28} {:-<20} {:-<12} {:-<10} {:-<12}",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (idx, r) in rows.iter().take(top_n).enumerate() {
        out.push_str(
            format!(
                "{:>4} {:<28} {:<20} {:>12} {:>10} {:>12}",
                idx,
                truncate(&r.base.region, 28),
                truncate(&r.base.country, 20),
                fmt_count(r.latest_confirmed),
                fmt_count(r.latest_deaths),
                fmt_count(r.latest_recovered),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_count(v: Option<u64>) -> String {
    v.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
