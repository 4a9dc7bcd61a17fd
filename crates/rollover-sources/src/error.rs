use thiserror::Error;

pub use reqwest::StatusCode;

#[derive(Error, Debug)]
pub enum SourceError {
    /// The request never produced a response (connection refused, timeout, TLS, ...)
    #[error("{context}: {source}")]
    Request {
        context: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{context}: server answered {status}")]
    Status {
        context: String,
        status: StatusCode,
    },
    /// The response arrived but lacked the fields we need
    #[error("{0}")]
    DataUnavailable(String),
}

impl SourceError {
    pub fn request(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            context: context.into(),
            source,
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::DataUnavailable(message.into())
    }

    /// True for failures of the transport rather than of the payload
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Status { .. })
    }
}
