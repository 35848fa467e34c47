use remap_engine::RemapError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Remap(#[from] RemapError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: expected a JSON {expected}")]
    Shape { line: usize, expected: &'static str },

    #[error("line {line}: {source}")]
    Map { line: usize, source: RemapError },
}
