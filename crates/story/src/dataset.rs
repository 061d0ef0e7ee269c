//! Raw tabular datasets and the field coercions shared by every chart.
//!
//! A [`Dataset`] keeps every field as text; charts pick the columns they need
//! and coerce them with [`parse_number`] / [`parse_date`]. Coercion failures
//! return `None` so callers can drop the record.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::LoadError;

/// Header-keyed table of raw text fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    fields: &'a [String],
}

impl<'a> Record<'a> {
    /// Field for `column`, or `None` when the column is unknown or the row is short.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.fields.get(idx).map(String::as_str)
    }
}

impl Dataset {
    /// Parse delimited text whose first row is the header.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|fields| Record {
            columns: &self.columns,
            fields,
        })
    }

    /// Resolve one column per keyword group, failing if any group has no match.
    pub fn require_columns<const N: usize>(
        &self,
        groups: [&[&str]; N],
    ) -> Result<[String; N], LoadError> {
        let mut found: [String; N] = std::array::from_fn(|_| String::new());
        for (slot, keywords) in found.iter_mut().zip(groups) {
            match find_column(&self.columns, keywords) {
                Some(column) => *slot = column.to_string(),
                None => {
                    return Err(LoadError::MissingColumns {
                        available: self.columns.clone(),
                    })
                }
            }
        }
        Ok(found)
    }
}

/// Parse delimited text without treating any row as a header.
///
/// Rows may have differing lengths; callers index columns positionally.
/// Blank lines before or between records come back as a single empty field
/// so positional skips count physical lines.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut consumed = 0usize;
    while reader.read_record(&mut record)? {
        let start = record
            .position()
            .map_or(consumed, |pos| pos.byte() as usize);
        let after_cr = consumed > 0 && text.as_bytes().get(consumed - 1) == Some(&b'\r');
        let skipped = blank_lines(text.get(consumed..start).unwrap_or(""), after_cr);
        rows.extend(std::iter::repeat_with(|| vec![String::new()]).take(skipped));
        rows.push(record.iter().map(str::to_string).collect());
        consumed = reader.position().byte() as usize;
    }
    Ok(rows)
}

/// Line breaks in the text the reader skipped between two records. A `\n`
/// right after a consumed `\r` finishes that record's terminator.
fn blank_lines(gap: &str, after_cr: bool) -> usize {
    let breaks = gap.matches('\n').count();
    if after_cr && gap.starts_with('\n') {
        breaks - 1
    } else {
        breaks
    }
}

/// Numeric coercion: trims, strips thousands separators, rejects non-finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fixed-format date coercion.
///
/// Accepts `YYYY-MM-DD`, the same followed by a time (`T` or space
/// separated), and `MM/DD/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// First column whose lowercased name contains any keyword, tried in keyword order.
pub fn find_column<'a>(columns: &'a [String], keywords: &[&str]) -> Option<&'a str> {
    let lower: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    keywords.iter().find_map(|kw| {
        let kw = kw.to_lowercase();
        lower
            .iter()
            .position(|c| c.contains(&kw))
            .map(|idx| columns[idx].as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_strips_separators() {
        assert_eq!(parse_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_number("  42.5 "), Some(42.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 7, 1);
        assert_eq!(parse_date("2021-07-01"), expected);
        assert_eq!(parse_date("2021-07-01 00:00:00"), expected);
        assert_eq!(parse_date("2021-07-01T12:30:00"), expected);
        assert_eq!(parse_date("07/01/2021"), expected);
        assert_eq!(parse_date("July 2021"), None);
    }

    #[test]
    fn test_find_column_keyword_priority() {
        let cols: Vec<String> = ["Year", "Pop_Total", "Water_Prod_AF"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(find_column(&cols, &["year"]), Some("Year"));
        assert_eq!(find_column(&cols, &["water", "prod"]), Some("Water_Prod_AF"));
        assert_eq!(find_column(&cols, &["pop"]), Some("Pop_Total"));
        assert_eq!(find_column(&cols, &["storage"]), None);
    }

    #[test]
    fn test_dataset_records_by_column() {
        let ds = Dataset::parse("Year,Value\n1990,\"1,000\"\n1991,7\n").unwrap();
        assert_eq!(ds.columns().to_vec(), vec!["Year".to_string(), "Value".to_string()]);
        assert_eq!(ds.len(), 2);
        let values: Vec<Option<f64>> = ds
            .records()
            .map(|r| r.get("Value").and_then(parse_number))
            .collect();
        assert_eq!(values, vec![Some(1000.0), Some(7.0)]);
    }

    #[test]
    fn test_short_rows_yield_none() {
        let ds = Dataset::parse("a,b,c\n1,2\n").unwrap();
        let record = ds.records().next().unwrap();
        assert_eq!(record.get("a"), Some("1"));
        assert_eq!(record.get("c"), None);
        assert_eq!(record.get("zzz"), None);
    }

    #[test]
    fn test_require_columns_reports_available() {
        let ds = Dataset::parse("Year,Flow\n2000,1\n").unwrap();
        let [year] = ds.require_columns([&["year"]]).unwrap();
        assert_eq!(year, "Year");
        match ds.require_columns([&["year"], &["pop"]]) {
            Err(LoadError::MissingColumns { available }) => {
                assert_eq!(available, vec!["Year".to_string(), "Flow".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rows_flexible_lengths() {
        let rows = parse_rows("title\n\na,b,c\n1,\"2,000\",3\n").unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], vec![String::new()]);
        assert_eq!(rows[2].len(), 3);
        assert_eq!(rows[3][1], "2,000");
    }

    #[test]
    fn test_parse_rows_keeps_blank_preamble_lines() {
        let rows = parse_rows("t1\n\nt3\nt4\nt5\nt6\nh,1906\n").unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[1], vec![String::new()]);
        assert_eq!(rows[6], vec!["h".to_string(), "1906".to_string()]);
    }

    #[test]
    fn test_parse_rows_blank_lines_with_crlf() {
        let rows = parse_rows("\r\nt2\r\n\r\n\r\nt5\r\n").unwrap();
        let firsts: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(firsts, vec!["", "t2", "", "", "t5"]);
    }

    #[test]
    fn test_parse_rows_quoted_newline_is_not_blank() {
        let rows = parse_rows("\"a\n\nb\",1\nc,2\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "a\n\nb");
        assert_eq!(rows[1][0], "c");
    }
}
