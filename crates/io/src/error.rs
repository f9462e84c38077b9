use std::fmt;

/// Ingestion failure. Every variant names the source it came from.
#[derive(Debug)]
pub enum IngestError {
    /// File could not be read.
    Io { label: String, message: String },
    /// Bytes are neither UTF-8 nor clean Windows-1250.
    Encoding { label: String },
    /// No header row.
    Empty { label: String },
    /// Mapped columns absent from the header row.
    MissingColumn { label: String, columns: Vec<String> },
    /// Malformed delimited text.
    Csv { label: String, message: String },
}

impl IngestError {
    pub fn label(&self) -> &str {
        match self {
            Self::Io { label, .. }
            | Self::Encoding { label }
            | Self::Empty { label }
            | Self::MissingColumn { label, .. }
            | Self::Csv { label, .. } => label,
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { label, message } => write!(f, "{label}: cannot read file: {message}"),
            Self::Encoding { label } => {
                write!(f, "{label}: cannot decode as UTF-8 or Windows-1250")
            }
            Self::Empty { label } => write!(f, "{label}: no header row"),
            Self::MissingColumn { label, columns } => {
                let quoted: Vec<String> = columns.iter().map(|c| format!("'{c}'")).collect();
                write!(f, "{label}: missing column(s) {}", quoted.join(", "))
            }
            Self::Csv { label, message } => write!(f, "{label}: {message}"),
        }
    }
}

impl std::error::Error for IngestError {}
