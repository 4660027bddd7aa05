use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("status update for {payment_id} rejected with {status}")]
    Rejected {
        payment_id: String,
        status: StatusCode,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid header {0:?}, expected `Name: value`")]
    MalformedHeader(String),

    #[error("invalid header {header:?}: {reason}")]
    InvalidHeader { header: String, reason: String },
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        #[derive(serde::Serialize)]
        struct ErrorBody {
            error: String,
        }

        let status = match &self {
            ProcessError::Relay(RelayError::Transport(_)) => StatusCode::BAD_GATEWAY,
            ProcessError::Rejected { .. } => StatusCode::BAD_GATEWAY,
        };

        tracing::error!(err = ?self, %status, "process_err");

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
