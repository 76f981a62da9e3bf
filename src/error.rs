use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Column '{column}' of table '{table}' has the wrong type, expected {expected}")]
    ColumnType {
        table: String,
        column: String,
        expected: &'static str,
    },

    #[error("Column '{column}' has {actual} rows but the table has {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{column}' of table '{table}' contains missing values")]
    MissingValues { table: String, column: String },

    #[error("Column '{column}' of table '{table}' must only contain 0 or 1")]
    NonBinaryMask { table: String, column: String },

    #[error("Duplicated unique_id '{0}' in static table")]
    DuplicateStatic(String),

    #[error("Series '{unique_id}' has {count} rows in static table, expected 1")]
    StaticMatch { unique_id: String, count: usize },

    #[error("Duplicated (unique_id, ds) pair ('{unique_id}', {ds}) in table '{table}'")]
    DuplicateKey {
        table: String,
        unique_id: String,
        ds: i64,
    },

    #[error("The dimensions of the target table ({expected}) and '{table}' ({actual}) are not the same")]
    RowCount {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Mismatch in '{table}' and target keys at sorted row {row}")]
    Misaligned { table: String, row: usize },

    #[error("The target table has no rows")]
    EmptyPanel,

    #[error("Insufficient len of sample chunks {len_sample_chunks}, need at least {required}")]
    SampleChunks {
        len_sample_chunks: usize,
        required: usize,
    },

    #[error("Window sampling limit {limit} should be at least the window size {window_size}")]
    WindowSamplingLimit { limit: usize, window_size: usize },

    #[error("There is no window strategy for '{0}'")]
    UnknownMode(String),

    #[error("Some variables in [{0}] are not available exogenous columns")]
    UnknownFutureColumns(String),

    #[error("Invalid configuration '{name}': {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("Invalid series selection: {0}")]
    InvalidIndex(String),

    #[error("Time Series {0:?} are not samplable. Check the data, masks, window_sampling_limit, input_size, output_size")]
    NonSamplable(Vec<usize>),

    #[error("No series has enough sampleable timestamps to resample from")]
    NoSamplableSeries,

    #[error("Exhausted {retries} resampling retries without finding a samplable window")]
    ExhaustedRetries { retries: usize },
}
