use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sheet not found - sheet_name={name}")]
    SheetNotFound { name: String },

    #[error("row not found - keyword={keyword}")]
    RowNotFound { keyword: String },

    #[error("column not found - column={column}")]
    ColumnNotFound { column: String },

    #[error("object not found - s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// Zero or several candidates survived validation.
    #[error("image prefixes found for brain_id={brain_id} - {candidates:?}")]
    AmbiguousImagePrefix {
        brain_id: String,
        candidates: Vec<String>,
    },

    #[error("invalid coordinate {input:?}: {reason}")]
    InvalidCoordinate { input: String, reason: String },

    #[error("invalid sample name {value:?} (expected <brain_id>_<segmentation_id>)")]
    InvalidSample { value: String },

    #[error("row {row_id} links to unknown parent row {parent_id}")]
    DanglingParent { row_id: i64, parent_id: i64 },

    #[error("row index {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("column {column:?} missing from {path}")]
    MissingCsvColumn { column: String, path: String },

    #[error("invalid s3 uri: {0}")]
    InvalidS3Uri(String),

    #[error("invalid config value for {key}: {value:?}")]
    Config { key: String, value: String },

    #[error("http {status} from {url}")]
    Http { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed listing: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by an external collaborator implementation.
    #[error("service error: {0}")]
    Service(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SheetNotFound { .. }
                | Error::RowNotFound { .. }
                | Error::ColumnNotFound { .. }
                | Error::ObjectNotFound { .. }
        )
    }
}
