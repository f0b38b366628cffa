use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed encoding: {0}")]
    Malformed(String),

    #[error("encoding exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("action data is not encodable: {0}")]
    Data(String),
}
