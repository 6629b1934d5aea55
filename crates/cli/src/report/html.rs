// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTML coverage report output.

use std::fmt::Write;

use super::CoverageFormatter;
use crate::coverage::{CoverageResult, FileCoverage, LineHits};

/// Presentation band for a coverage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageBand {
    High,
    Medium,
    Low,
    Terrible,
}

impl CoverageBand {
    pub fn of(percent: f64) -> Self {
        if percent >= 75.0 {
            CoverageBand::High
        } else if percent >= 50.0 {
            CoverageBand::Medium
        } else if percent >= 25.0 {
            CoverageBand::Low
        } else {
            CoverageBand::Terrible
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            CoverageBand::High => "high",
            CoverageBand::Medium => "medium",
            CoverageBand::Low => "low",
            CoverageBand::Terrible => "terrible",
        }
    }
}

/// HTML coverage page formatter.
pub struct HtmlFormatter;

impl HtmlFormatter {
    fn css() -> &'static str {
        r#":root {
      --bg: #1a1a2e;
      --card-bg: #16213e;
      --text: #eef;
      --muted: #8892b0;
      --accent: #64ffda;
    }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
      background: var(--bg);
      color: var(--text);
      padding: 2rem;
      line-height: 1.6;
    }
    .container { max-width: 1200px; margin: 0 auto; }
    header { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 1px solid var(--card-bg); }
    h1 { color: var(--accent); font-size: 1.5rem; }
    h2 { font-size: 1.1rem; margin: 2rem 0 0.5rem; }
    .meta { color: var(--muted); font-size: 0.875rem; margin-top: 0.5rem; }
    table { width: 100%; border-collapse: collapse; background: var(--card-bg); }
    th, td { padding: 0.25rem 1rem; text-align: left; }
    th { background: rgba(0,0,0,0.2); color: var(--muted); font-size: 0.75rem; text-transform: uppercase; }
    td.num { text-align: right; font-family: monospace; }
    pre { margin: 0; }
    .high { color: #10b981; }
    .medium { color: #f59e0b; }
    .low { color: #f97316; }
    .terrible { color: #ef4444; }
    tr.hit td.hits { color: #10b981; }
    tr.miss { background: rgba(239,68,68,0.15); }"#
    }

    fn render_summary_row(file: &FileCoverage) -> String {
        let (percent, class) = describe(file.percentage());
        let anchor = anchor_id(&file.filename);
        let name = escape(&file.filename);
        format!(
            r##"        <tr><td><a href="#{anchor}">{name}</a></td><td class="num {class}">{percent}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td></tr>"##,
            file.sloc, file.hits, file.misses
        )
    }

    fn render_file(file: &FileCoverage) -> String {
        let (percent, class) = describe(file.percentage());
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"    <section id="{}">
      <h2>{} <span class="{class}">{percent}</span></h2>
      <table>
        <tbody>"#,
            anchor_id(&file.filename),
            escape(&file.filename)
        );
        for (line, cov) in &file.source {
            let (row_class, hits) = match cov.coverage {
                LineHits::Empty => ("", String::new()),
                LineHits::Count(0) => ("miss", "0".to_string()),
                LineHits::Count(n) => ("hit", n.to_string()),
            };
            let text = escape(cov.source.as_deref().unwrap_or(""));
            let _ = writeln!(
                out,
                r#"          <tr class="{row_class}"><td class="num">{line}</td><td class="num hits">{hits}</td><td><pre>{text}</pre></td></tr>"#
            );
        }
        out.push_str("        </tbody>\n      </table>\n    </section>");
        out
    }
}

impl CoverageFormatter for HtmlFormatter {
    fn file_name(&self) -> &'static str {
        "index.html"
    }

    fn format(&self, result: &CoverageResult) -> String {
        let css = Self::css();
        let (total, class) = describe(result.coverage);
        let rows: Vec<String> = result.files.iter().map(Self::render_summary_row).collect();
        let files: Vec<String> = result.files.iter().map(Self::render_file).collect();
        let rows = rows.join("\n");
        let files = files.join("\n");
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Coverage</title>
  <style>
    {css}
  </style>
</head>
<body>
  <div class="container">
    <header>
      <h1>Coverage <span class="{class}">{total}</span></h1>
      <div class="meta">{sloc} lines &middot; {hits} hits &middot; {misses} misses &middot; {count} files</div>
    </header>
    <section>
      <table>
        <thead><tr><th>File</th><th>Coverage</th><th>SLOC</th><th>Hits</th><th>Misses</th></tr></thead>
        <tbody>
{rows}
        </tbody>
      </table>
    </section>
{files}
  </div>
</body>
</html>
"#,
            sloc = result.sloc,
            hits = result.hits,
            misses = result.misses,
            count = result.files.len(),
        )
    }
}

/// Formatted percentage and band class; files without lines show no band.
fn describe(percent: Option<f64>) -> (String, &'static str) {
    match percent {
        Some(p) => (format!("{p:.0}%"), CoverageBand::of(p).class()),
        None => ("n/a".to_string(), ""),
    }
}

fn anchor_id(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
