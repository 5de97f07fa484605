use crate::benchmark::{BenchmarkSessionRecord, HistoricalSummary, LiveBenchmarkSnapshot};

pub const SESSION_HEADER: [&str; 10] = [
    "ID",
    "Algorithm",
    "Avg Latency",
    "Std Dev",
    "Min",
    "Max",
    "Throughput",
    "Error Rate",
    "Encryption Time",
    "Timestamp",
];

pub const LIVE_HEADER: [&str; 7] = [
    "Algorithm",
    "Avg Latency",
    "Std Dev",
    "Min",
    "Max",
    "Throughput",
    "Error Rate",
];

pub const HISTORY_HEADER: [&str; 8] = [
    "Algorithm",
    "Avg Latency",
    "Avg Std Dev",
    "Avg Min",
    "Avg Max",
    "Avg Throughput",
    "Avg Error Rate",
    "Avg Encryption Time",
];

/// Formats a metric with exactly two decimals.
///
/// Exact half-way values round away from zero (`0.125` -> `0.13`), the way a
/// browser's `Number.prototype.toFixed(2)` does, rather than to even.
pub fn format_metric(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0.00".to_string();
    }

    let magnitude = value.abs();
    let scaled = magnitude * 1000.0;
    let is_tie = (magnitude * 8.0).fract() == 0.0 && scaled.fract() == 0.0 && scaled % 10.0 == 5.0;
    if !is_tie {
        return format!("{:.2}", value);
    }

    let rounded = (scaled + 5.0) / 1000.0;
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{:.2}", sign, rounded)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A rendered benchmark table: one header row plus one row per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    pub fn sessions(records: &[BenchmarkSessionRecord]) -> Self {
        let mut table = Self::new(&SESSION_HEADER);
        for r in records {
            table.push_row(vec![
                r.id.to_string(),
                r.algorithm.clone(),
                format_metric(r.latency),
                format_metric(r.stddev),
                format_metric(r.min_latency),
                format_metric(r.max_latency),
                format_metric(r.throughput),
                format_metric(r.error_rate),
                format_metric(r.encryption_time),
                r.timestamp.clone(),
            ]);
        }
        table
    }

    pub fn live(snapshot: &LiveBenchmarkSnapshot) -> Self {
        let mut table = Self::new(&LIVE_HEADER);
        for (algorithm, m) in snapshot.iter() {
            table.push_row(vec![
                algorithm.to_string(),
                format_metric(m.average_latency),
                format_metric(m.stddev_latency),
                format_metric(m.min_latency),
                format_metric(m.max_latency),
                format_metric(m.throughput),
                format_metric(m.error_rate),
            ]);
        }
        table
    }

    pub fn history(summaries: &[HistoricalSummary]) -> Self {
        let mut table = Self::new(&HISTORY_HEADER);
        for s in summaries {
            table.push_row(vec![
                s.algorithm.clone(),
                format_metric(s.avg_latency),
                format_metric(s.avg_stddev),
                format_metric(s.avg_min_latency),
                format_metric(s.avg_max_latency),
                format_metric(s.avg_throughput),
                format_metric(s.avg_error_rate),
                format_metric(s.avg_encryption_time),
            ]);
        }
        table
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Header row included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn to_html(&self) -> String {
        let mut lines = Vec::with_capacity(self.row_count());
        lines.push(html_row("th", &self.header));
        lines.extend(self.rows.iter().map(|row| html_row("td", row)));
        lines.join("\n")
    }

    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let mut out = vec![format_line(&self.header), "-".repeat(total)];
        out.extend(self.rows.iter().map(|row| format_line(row)));
        out.join("\n")
    }
}

fn html_row(tag: &str, cells: &[String]) -> String {
    let mut out = String::from("<tr>");
    for cell in cells {
        out.push_str(&format!("<{tag}>{}</{tag}>", escape_html(cell)));
    }
    out.push_str("</tr>");
    out
}
