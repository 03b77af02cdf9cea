/// Reads a delimited export into a header row plus raw string rows.
///
/// Exports arrive with `;`, `,` or tab separators depending on the locale of
/// whoever produced them, so the delimiter is sniffed from the header line.
use super::IngestError;
use std::path::Path;
use tracing::{debug, info};

/// Delimiters tried, in tie-break order.
pub const CANDIDATE_DELIMITERS: [u8; 3] = [b';', b',', b'\t'];

const UTF8_BOM: char = '\u{feff}';

/// A parsed but uninterpreted table.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub delimiter: u8,
    pub headers: Vec<String>,
    pub rows: Vec<csv::StringRecord>,
}

impl RawTable {
    /// Trimmed cell value, `None` when absent or blank.
    pub fn cell(row: &csv::StringRecord, index: Option<usize>) -> Option<&str> {
        let value = row.get(index?)?.trim();
        (!value.is_empty()).then_some(value)
    }
}

/// The candidate delimiter that occurs most often in `header_line`.
/// Ties go to the earlier candidate; a line with none of them yields `,`.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0usize);
    for candidate in CANDIDATE_DELIMITERS {
        let count = header_line.bytes().filter(|&b| b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Parse delimited text. Rows may be ragged; missing trailing cells read as null.
pub fn read_table(text: &str) -> Result<RawTable, IngestError> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let header_line = text.lines().find(|l| !l.trim().is_empty()).ok_or(IngestError::Empty)?;
    let delimiter = sniff_delimiter(header_line);
    debug!("Sniffed delimiter {:?}", delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::Empty);
    }

    let rows = reader
        .records()
        .filter(|row| !matches!(row, Ok(r) if r.iter().all(str::is_empty)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawTable {
        delimiter,
        headers,
        rows,
    })
}

/// Read and parse a file from disk.
pub fn load_table(path: &Path) -> Result<RawTable, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let table = read_table(&text)?;
    info!(
        "Loaded {} rows × {} columns from {}",
        table.rows.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}
