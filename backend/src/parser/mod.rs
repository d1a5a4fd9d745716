//! CSV loader with encoding and delimiter auto-detection.
//!
//! Purely structural ingestion: rows come out as untyped string cells in
//! header order. No null handling, trimming or type coercion happens here.

use csv::ReaderBuilder;
use std::path::Path;

use crate::error::{LoadError, LoadResult};

/// Untyped table read from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column headers (trimmed)
    pub headers: Vec<String>,
    /// Data rows, each padded or truncated to the header width
    pub rows: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl RawTable {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    /// Position of a column by exact header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Latin-1 labels decode as windows-1252, the WHATWG mapping for them.
/// Bytes that are not valid UTF-8 under a UTF-8 label fall back to
/// windows-1252, which maps every byte. Other labels go through
/// `encoding_rs`; an unknown label is an error.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let label = encoding.to_lowercase();
    let content = match label.as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            // chardet can report utf-8 for mostly-ascii latin-1 files
            Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        other => {
            let decoder = encoding_rs::Encoding::for_label(other.as_bytes())
                .ok_or_else(|| LoadError::Encoding(format!("unsupported encoding '{}'", encoding)))?;
            decoder.decode(bytes).0.into_owned()
        }
    };

    match content.strip_prefix('\u{feff}') {
        Some(stripped) => Ok(stripped.to_string()),
        None => Ok(content),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Comma wins ties.
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

/// Load a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let table = salesdash::load("train.csv")?;
/// println!("{} rows x {} columns", table.rows.len(), table.headers.len());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<RawTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    load_bytes(&bytes)
}

/// Load CSV bytes with auto-detection of encoding and delimiter.
///
/// Valid UTF-8 is taken as-is; chardet is only consulted otherwise.
pub fn load_bytes(bytes: &[u8]) -> LoadResult<RawTable> {
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        "utf-8".to_string()
    } else {
        detect_encoding(bytes)
    };
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_str(&content, delimiter, encoding)
}

/// Parse CSV text with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> LoadResult<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let width = headers.len();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    Ok(RawTable {
        headers,
        rows,
        encoding,
        delimiter,
    })
}
