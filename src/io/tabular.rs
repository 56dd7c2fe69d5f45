//! Delimited-text parsing.
//!
//! Turns raw CSV text into rows of fields. No header handling happens here;
//! callers decide which row is the header.

use csv::StringRecord;

use crate::error::HistoryError;

/// Parse CSV text into rows, preserving row and column order.
///
/// Rows must all have the same width. Blank lines are ignored.
pub fn parse_rows(text: &str) -> Result<Vec<StringRecord>, HistoryError> {
    // The csv reader treats an unclosed quote as running to EOF, so catch it
    // up front.
    if let Some(line) = unterminated_quote_line(text) {
        return Err(HistoryError::parse(line, "unterminated quoted field"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            HistoryError::parse(line, csv_error_message(&e))
        })?;
        rows.push(record);
    }

    Ok(rows)
}

fn csv_error_message(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    }
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted { opened_at: u64 },
    /// A quote seen inside a quoted field: either the close or half of `""`.
    QuoteInQuoted { opened_at: u64 },
}

/// Line (1-based) of a quote that is opened and never closed.
///
/// A quote only opens a quoted field at the start of that field; quotes inside
/// unquoted text are literal, as the csv reader treats them.
fn unterminated_quote_line(text: &str) -> Option<u64> {
    use QuoteState::*;

    let mut line = 1u64;
    let mut state = FieldStart;
    for ch in text.chars() {
        if ch == '\n' {
            line += 1;
        }
        state = match (state, ch) {
            (FieldStart, '"') => Quoted { opened_at: line },
            (Quoted { opened_at }, '"') => QuoteInQuoted { opened_at },
            (Quoted { .. }, _) => state,
            (QuoteInQuoted { opened_at }, '"') => Quoted { opened_at },
            (_, ',' | '\n') => FieldStart,
            _ => Unquoted,
        };
    }

    match state {
        Quoted { opened_at } => Some(opened_at),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_quoted_delimiters_in_one_field() {
        let text = "a,b,c\n\"Korea, South\",x,1\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "Korea, South");
        assert_eq!(&rows[1][2], "1");
    }

    #[test]
    fn escaped_quotes_are_not_unterminated() {
        let rows = parse_rows("\"say \"\"hi\"\"\",2\n").unwrap();
        assert_eq!(&rows[0][0], "say \"hi\"");
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let err = parse_rows("a,b\n\"open,2\n3,4\n").unwrap_err();
        match err {
            HistoryError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("unterminated"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn quote_inside_unquoted_field_is_literal() {
        let rows = parse_rows("a,b\n5\" x,3\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "5\" x");
        assert_eq!(&rows[1][1], "3");
    }

    #[test]
    fn unterminated_quote_reports_opening_line() {
        let err = parse_rows("a,b\n1,2\n3,\"x\ny\n").unwrap_err();
        assert!(matches!(err, HistoryError::Parse { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_rows("a,b,c\n1,2\n").unwrap_err();
        match err {
            HistoryError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 3 fields"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_text_has_no_rows() {
        assert!(parse_rows("").unwrap().is_empty());
    }
}
