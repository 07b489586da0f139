//! Server-side rendering of the marks page.
//!
//! All user-controlled text is HTML-escaped before it reaches the page.

use marksheet_core::{Notice, Record};
use std::fmt::Write;
use time::macros::format_description;
use time::OffsetDateTime;

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Customer Marks</title>
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <style>
    body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Helvetica,Arial,sans-serif;margin:2rem;max-width:800px}
    form{display:grid;gap:0.75rem;max-width:420px}
    label{font-weight:600}
    input{padding:.6rem .7rem;border:1px solid #ccc;border-radius:8px;width:100%}
    button{padding:.6rem .9rem;border:0;border-radius:8px;background:#111;color:white;cursor:pointer}
    table{border-collapse:collapse;width:100%;margin-top:2rem}
    th,td{border:1px solid #eee;padding:.6rem;text-align:left}
    th{background:#fafafa}
    .flash{padding:.6rem .8rem;background:#eef;border:1px solid #cdd;border-radius:8px;margin:.75rem 0}
    .error{background:#fee;border-color:#fcc}
  </style>
</head>
<body>
  <h1>Customer Marks</h1>
"#;

const PAGE_FORM: &str = r#"
  <form method="post" action="/add">
    <div>
      <label for="name">Name</label>
      <input id="name" name="name" placeholder="e.g., Abhishek" required>
    </div>
    <div>
      <label for="marks">Marks</label>
      <input id="marks" name="marks" type="number" inputmode="numeric" placeholder="e.g., 92" required>
    </div>
    <button type="submit">Save</button>
  </form>

  <h2>Recent Entries</h2>
  <table>
    <thead>
      <tr><th>ID</th><th>Created At</th><th>Name</th><th>Marks</th></tr>
    </thead>
    <tbody>
"#;

const EMPTY_ROW: &str =
    "      <tr><td colspan=\"4\">No data yet. Add your first record above.</td></tr>\n";

const PAGE_TAIL: &str = r#"    </tbody>
  </table>
</body>
</html>
"#;

/// Renders the full page: notices, the entry form and the records table.
pub fn render_page(records: &[Record], notices: &[Notice]) -> String {
    let mut page = String::with_capacity(4096);
    page.push_str(PAGE_HEAD);

    for notice in notices {
        let class = if notice.is_error() {
            "flash error"
        } else {
            "flash"
        };
        let _ = writeln!(
            page,
            "  <div class=\"{class}\">{}</div>",
            escape_html(&notice.message)
        );
    }

    page.push_str(PAGE_FORM);
    if records.is_empty() {
        page.push_str(EMPTY_ROW);
    }
    for record in records {
        let _ = writeln!(
            page,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            record.id,
            format_created_at(record.created_at),
            escape_html(&record.name),
            record.marks
        );
    }
    page.push_str(PAGE_TAIL);
    page
}

/// Formats epoch milliseconds as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Out-of-range values fall back to the raw number.
pub fn format_created_at(epoch_ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|created_at| created_at.format(format).ok())
        .unwrap_or_else(|| epoch_ms.to_string())
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_html, format_created_at, render_page};
    use marksheet_core::{Notice, Record};

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<b a="1">Tom & 'Jerry'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn created_at_is_rendered_in_utc() {
        assert_eq!(format_created_at(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_created_at(1_700_000_000_999), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn render_page_marks_error_notices_and_lists_rows() {
        let records = vec![Record {
            id: 7,
            created_at: 0,
            name: "Abhishek".to_string(),
            marks: 92,
        }];
        let page = render_page(&records, &[Notice::error("boom"), Notice::info("saved")]);

        assert!(page.contains(r#"<div class="flash error">boom</div>"#));
        assert!(page.contains(r#"<div class="flash">saved</div>"#));
        assert!(page.contains("<td>7</td><td>1970-01-01 00:00:00 UTC</td><td>Abhishek</td><td>92</td>"));
        assert!(!page.contains("No data yet"));
    }

    #[test]
    fn render_page_shows_placeholder_for_empty_table() {
        let page = render_page(&[], &[]);
        assert!(page.contains("No data yet"));
    }
}
