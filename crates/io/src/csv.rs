// Price list import / comparison export

use std::path::{Path, PathBuf};

use pricecomp_recon::config::ColumnMapping;
use pricecomp_recon::model::{ComparisonRow, Source, SourceRecord};

use crate::decode::{decode_text, sniff_delimiter};
use crate::error::IngestError;

/// Source label for a file: its file name, as the wholesaler is known by it.
pub fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load every file, stopping at the first failure.
pub fn load_sources(paths: &[PathBuf], columns: &ColumnMapping) -> Result<Vec<Source>, IngestError> {
    paths.iter().map(|p| load_source(p, columns)).collect()
}

pub fn load_source(path: &Path, columns: &ColumnMapping) -> Result<Source, IngestError> {
    let label = source_label(path);
    let bytes = std::fs::read(path).map_err(|e| IngestError::Io {
        label: label.clone(),
        message: e.to_string(),
    })?;
    load_source_from_bytes(&label, &bytes, columns)
}

/// Decode, sniff the delimiter, map columns and coerce prices.
pub fn load_source_from_bytes(
    label: &str,
    bytes: &[u8],
    columns: &ColumnMapping,
) -> Result<Source, IngestError> {
    let (text, encoding) = decode_text(bytes).ok_or_else(|| IngestError::Encoding {
        label: label.into(),
    })?;
    let delimiter = sniff_delimiter(&text);
    tracing::debug!(
        source = label,
        ?encoding,
        delimiter = %(delimiter as char).escape_default(),
        "decoded price list"
    );

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::Csv {
            label: label.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::Empty {
            label: label.into(),
        });
    }

    let idx = |name: &str| headers.iter().position(|h| h == name);
    let missing: Vec<String> = columns
        .fields()
        .iter()
        .filter(|(_, column)| idx(*column).is_none())
        .map(|(_, column)| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumn {
            label: label.into(),
            columns: missing,
        });
    }
    // Presence checked above
    let code_idx = idx(&columns.code).unwrap_or_default();
    let name_idx = idx(&columns.name).unwrap_or_default();
    let price_idx = idx(&columns.price).unwrap_or_default();

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| IngestError::Csv {
            label: label.into(),
            message: e.to_string(),
        })?;

        // Too many fields: the row is malformed, skip it. Short rows read as empty cells.
        if record.len() > headers.len() {
            skipped += 1;
            continue;
        }

        // Cells are kept verbatim; only the price is trimmed while parsing
        let field = |i: usize| record.get(i).unwrap_or("");
        records.push(SourceRecord {
            code: field(code_idx).to_string(),
            name: field(name_idx).to_string(),
            price: parse_price(field(price_idx)),
        });
    }

    if skipped > 0 {
        tracing::warn!(source = label, skipped, "skipped rows with extra fields");
    }

    Ok(Source::new(label, records))
}

/// Coerce a price cell. Anything that is not a finite number becomes `None`.
///
/// A decimal comma is accepted when the cell has no dot (`12,50`).
pub fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = if raw.contains(',') && !raw.contains('.') {
        raw.replacen(',', ".", 1)
    } else {
        raw.to_string()
    };
    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write comparison rows as CSV: product, one column per source, best, difference.
pub fn export_rows(path: &Path, sources: &[String], rows: &[ComparisonRow]) -> Result<(), String> {
    let file = std::fs::File::create(path).map_err(|e| e.to_string())?;
    write_rows(file, sources, rows)
}

pub fn write_rows<W: std::io::Write>(
    out: W,
    sources: &[String],
    rows: &[ComparisonRow],
) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = vec!["product"];
    header.extend(sources.iter().map(String::as_str));
    header.extend(["best_price", "difference"]);
    writer.write_record(&header).map_err(|e| e.to_string())?;

    for row in rows {
        let mut record: Vec<String> = Vec::with_capacity(sources.len() + 3);
        record.push(row.product.clone());
        record.extend(row.prices.iter().map(|p| format_cell(*p)));
        record.push(format_cell(row.best_price));
        record.push(format_cell(row.difference));
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
