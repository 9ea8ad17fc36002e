//! CSV reading with encoding and delimiter auto-detection.
//!
//! Produces a raw string table. Nothing here knows about customer records;
//! see [`crate::transform::normalize`] for that.

use std::path::Path;

use crate::error::{SourceError, SourceResult};

/// CSV parsing error with its source line
#[derive(Debug, Clone)]
pub struct CsvError {
    /// 1-based line, 0 when unknown
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "Line {}: {}", self.line, self.message)
        }
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
        CsvError::new(line, err.to_string())
    }
}

/// One data row as read from the file
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    /// Field at `index`, empty when the row is short
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub rows: Vec<RawRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    pub headers: Vec<String>,
}

impl ParseResult {
    /// Index of a header, matched exactly first and then case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading byte order mark is
/// removed so it cannot end up in the first header.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to a comma when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Quoted fields are supported, fields are trimmed, short rows are kept
/// (missing fields read as empty) and blank lines are skipped.
///
/// # Example
/// ```
/// use cinema_dashboard::parser::parse_str;
///
/// let parsed = parse_str("Type,Age\nGold,30\nSilver,41", ',', "utf-8").unwrap();
/// assert_eq!(parsed.headers, vec!["Type", "Age"]);
/// assert_eq!(parsed.rows[1].get(0), "Silver");
/// ```
pub fn parse_str(content: &str, delimiter: char, encoding: &str) -> Result<ParseResult, CsvError> {
    if content.trim().is_empty() {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    let delimiter_byte = u8::try_from(delimiter)
        .map_err(|_| CsvError::new(0, format!("Unsupported delimiter '{}'", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::new(1, "No headers found"));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        rows.push(RawRow {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(ParseResult {
        rows,
        encoding: encoding.to_string(),
        delimiter,
        headers,
    })
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, CsvError> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_str(&content, delimiter, &encoding)
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// A missing file is reported as [`SourceError::NotFound`].
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> SourceResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound { path: path.to_path_buf() },
        _ => SourceError::Io(e),
    })?;

    Ok(parse_bytes_auto(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let parsed = parse_str("name,age\nAlice,30\nBob,25", ',', "utf-8").unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].get(0), "Alice");
        assert_eq!(parsed.rows[0].get(1), "30");
        assert_eq!(parsed.rows[1].line, 3);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "Type,Note\n\"Gold\",\"Likes, popcorn\"";
        let parsed = parse_str(csv, ',', "utf-8").unwrap();

        assert_eq!(parsed.rows[0].get(0), "Gold");
        assert_eq!(parsed.rows[0].get(1), "Likes, popcorn");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let parsed = parse_str("a,b\n1,2\n\n , \n3,4\n", ',', "utf-8").unwrap();
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let parsed = parse_str("a,b,c\n1", ',', "utf-8").unwrap();

        assert_eq!(parsed.rows[0].get(0), "1");
        assert_eq!(parsed.rows[0].get(2), "");
    }

    #[test]
    fn test_column_index_case_insensitive_fallback() {
        let parsed = parse_str("type,AGE,Age\nGold,1,2", ',', "utf-8").unwrap();

        assert_eq!(parsed.column_index("Age"), Some(2));
        assert_eq!(parsed.column_index("Type"), Some(0));
        assert_eq!(parsed.column_index("Total"), None);
    }

    #[test]
    fn test_error_message_format() {
        assert_eq!(CsvError::new(5, "Invalid value").to_string(), "Line 5: Invalid value");
        assert_eq!(CsvError::new(0, "Unsupported delimiter").to_string(), "Unsupported delimiter");
    }

    #[test]
    fn test_unsupported_delimiter_error() {
        let err = parse_str("Type;Age\nGold;30", '€', "utf-8").unwrap_err();
        assert_eq!(err.line, 0);
        assert!(err.message.contains("Unsupported delimiter"));
    }

    #[test]
    fn test_empty_csv_error() {
        let err = parse_str("", ',', "utf-8").unwrap_err();
        assert!(err.message.contains("Empty"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_semicolon() {
        let result = parse_bytes_auto(b"Type;Age\nGold;30\nSilver;25").unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.headers, vec!["Type", "Age"]);
    }

    #[test]
    fn test_bom_stripped() {
        let result = parse_bytes_auto("\u{feff}Type,Age\nGold,30".as_bytes()).unwrap();
        assert_eq!(result.headers[0], "Type");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_csv_file_auto(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
