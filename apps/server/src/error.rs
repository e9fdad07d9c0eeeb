use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coinfolio_core::trades::SubmissionError;
use coinfolio_core::Error as CoreError;
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("{message}")]
    BadGateway { code: &'static str, message: String },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest { code, .. } => (StatusCode::BAD_REQUEST, *code),
            ApiError::BadGateway { code, .. } => (StatusCode::BAD_GATEWAY, *code),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("{} {}: {}", status.as_u16(), code, self);
        } else {
            tracing::debug!("{} {}: {}", status.as_u16(), code, self);
        }
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(_) => ApiError::bad_request("VALIDATION_ERROR", message),
            CoreError::SubmissionRejected(rejection) => submission_error(rejection, message),
            CoreError::Ledger(_) => ApiError::BadGateway {
                code: "LEDGER_UNAVAILABLE",
                message,
            },
        }
    }
}

fn submission_error(rejection: SubmissionError, message: String) -> ApiError {
    let code = match rejection {
        SubmissionError::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
        SubmissionError::UnknownSymbol(_) => "UNKNOWN_SYMBOL",
        SubmissionError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
        SubmissionError::ServerRejected { .. } => "SERVER_REJECTED",
        SubmissionError::Transport(_) => {
            return ApiError::BadGateway {
                code: "TRADE_SERVER_UNAVAILABLE",
                message,
            }
        }
    };
    ApiError::bad_request(code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinfolio_core::errors::ValidationError;
    use coinfolio_core::trades::LedgerError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_local_rejections_are_bad_requests() {
        let err: ApiError = CoreError::from(SubmissionError::InsufficientBalance {
            symbol: "BTCUSDT".into(),
            requested: dec!(2),
            available: dec!(1),
        })
        .into();
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "INSUFFICIENT_BALANCE")
        );
    }

    #[test]
    fn test_ledger_failures_are_bad_gateway() {
        let err: ApiError = CoreError::from(LedgerError::Request("refused".into())).into();
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_GATEWAY, "LEDGER_UNAVAILABLE")
        );
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_transport_failure_is_bad_gateway() {
        let err: ApiError = CoreError::from(SubmissionError::Transport("reset".into())).into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_missing_input_is_validation_error() {
        let err: ApiError = CoreError::from(ValidationError::MissingField("symbol")).into();
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
        assert!(err.to_string().contains("symbol"));
    }
}
