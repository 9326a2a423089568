use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, overlapping column roles, etc.).
    ConfigValidation(String),
    /// Required column absent from a source's header.
    MissingColumn { source: String, column: String },
    /// Source could not be read or parsed.
    SourceRead { source: String, message: String },
    /// Output could not be serialized or written.
    SinkWrite { sink: String, message: String },
}

impl MergeError {
    pub fn missing_column(source: &str, column: &str) -> Self {
        Self::MissingColumn {
            source: source.into(),
            column: column.into(),
        }
    }

    pub fn source_read(source: &str, message: impl Into<String>) -> Self {
        Self::SourceRead {
            source: source.into(),
            message: message.into(),
        }
    }

    pub fn sink_write(sink: &str, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "source '{source}': missing column '{column}'")
            }
            Self::SourceRead { source, message } => {
                write!(f, "cannot read source '{source}': {message}")
            }
            Self::SinkWrite { sink, message } => {
                write!(f, "cannot write '{sink}': {message}")
            }
        }
    }
}

impl std::error::Error for MergeError {}
