//! Jira CSV detection
//!
//! Decides whether an agent reply is the `Summary,Description,Labels` export.
//! The check is a heuristic over text that has already been printed: it never
//! fails, never changes the text, and a parse error simply means "no".

use tracing::debug;

/// Column names the export contract requires
const REQUIRED_KEYWORDS: [&str; 3] = ["Summary", "Description", "Labels"];

/// Headers that must survive the parse. `Description` is not required here.
const REQUIRED_HEADERS: [&str; 2] = ["Summary", "Labels"];

/// Check whether `text` looks like the Jira-importable user story CSV
pub fn looks_like_jira_csv(text: &str) -> bool {
    // Cheap gate: every keyword present and more than one line
    if !REQUIRED_KEYWORDS.iter().all(|k| text.contains(k)) || line_count(text) <= 1 {
        return false;
    }

    match parse_headers(text) {
        Some(headers) => REQUIRED_HEADERS.iter().all(|r| headers.iter().any(|h| h == r)),
        None => false,
    }
}

/// Count lines the way the CSV reader splits records: `\n`, `\r\n` and a bare `\r`
fn line_count(text: &str) -> usize {
    text.replace("\r\n", "\n").replace('\r', "\n").lines().count()
}

/// Check for a quoted field still open at the end of `text`
///
/// The CSV reader silently reads an open quote through to the end of input.
/// A `"` in the middle of an unquoted field is plain text and does not count.
fn has_open_quote(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;
    let mut field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // `""` is an escaped quote inside the field
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match c {
            '"' if field_start => in_quotes = true,
            ',' | '\n' | '\r' => {
                field_start = true;
                continue;
            }
            _ => {}
        }
        field_start = false;
    }

    in_quotes
}

/// Parse `text` as CSV, returning the header row if every record is well formed
fn parse_headers(text: &str) -> Option<Vec<String>> {
    if has_open_quote(text) {
        debug!("parse_headers: unterminated quoted field");
        return None;
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(e) => {
            debug!(error = %e, "parse_headers: bad header row");
            return None;
        }
    };

    for record in reader.records() {
        if let Err(e) = record {
            debug!(error = %e, "parse_headers: bad record");
            return None;
        }
    }

    Some(headers)
}
