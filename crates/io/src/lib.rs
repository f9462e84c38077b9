// Price list ingestion and comparison export

pub mod csv;
pub mod decode;
pub mod error;

pub use self::csv::{export_rows, load_source, load_source_from_bytes, load_sources, parse_price, source_label, write_rows};
pub use decode::{decode_text, sniff_delimiter, TextEncoding};
pub use error::IngestError;
