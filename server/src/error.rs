use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use kernel::{ConflictKind, EntityKind, KernelError};
use serde_json::json;
use std::process::{ExitCode, Termination};

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub enum ErrorStatus {
    Kernel(Report<KernelError>),
    /// No resolvable `X-User-Id`.
    Unauthorized,
    Forbidden,
}

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus::Kernel(e)
    }
}

impl ErrorStatus {
    pub fn not_found(kind: EntityKind) -> Self {
        ErrorStatus::Kernel(Report::new(KernelError::NotFound(kind)))
    }

    fn status(&self) -> StatusCode {
        let report = match self {
            ErrorStatus::Unauthorized => return StatusCode::UNAUTHORIZED,
            ErrorStatus::Forbidden => return StatusCode::FORBIDDEN,
            ErrorStatus::Kernel(report) => report,
        };
        match report.current_context() {
            KernelError::NotFound(_) => StatusCode::NOT_FOUND,
            KernelError::Conflict(ConflictKind::BookUnavailable)
            | KernelError::Conflict(ConflictKind::AlreadyBorrowed) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            KernelError::Conflict(_) => StatusCode::CONFLICT,
            KernelError::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
            KernelError::Concurrency => StatusCode::CONFLICT,
            KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
            KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ErrorStatus::Unauthorized => "authentication required".to_string(),
            ErrorStatus::Forbidden => "operation not permitted".to_string(),
            ErrorStatus::Kernel(report) => match report.current_context() {
                KernelError::Internal => "internal server error".to_string(),
                // The first printable attachment carries the validation detail.
                KernelError::InvalidInput => report
                    .frames()
                    .find_map(|frame| frame.downcast_ref::<String>().cloned())
                    .or_else(|| {
                        report
                            .frames()
                            .find_map(|frame| frame.downcast_ref::<&str>().map(|s| s.to_string()))
                    })
                    .unwrap_or_else(|| KernelError::InvalidInput.to_string()),
                other => other.to_string(),
            },
        }
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if let ErrorStatus::Kernel(report) = &self {
            if status.is_server_error() {
                tracing::error!("{report:?}");
            } else {
                tracing::debug!("{report:?}");
            }
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use error_stack::Report;
    use kernel::{ConflictKind, EntityKind, KernelError};

    use super::ErrorStatus;

    fn status(error: KernelError) -> StatusCode {
        ErrorStatus::from(Report::new(error)).status()
    }

    #[test]
    fn kernel_errors_map_to_statuses() {
        assert_eq!(
            status(KernelError::NotFound(EntityKind::Book)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(KernelError::Conflict(ConflictKind::BookUnavailable)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(KernelError::Conflict(ConflictKind::AlreadyBorrowed)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(KernelError::Conflict(ConflictKind::IsbnTaken)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(KernelError::Conflict(ConflictKind::BookOnLoan)),
            StatusCode::CONFLICT
        );
        assert_eq!(status(KernelError::InvalidInput), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(KernelError::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorStatus::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorStatus::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn invalid_input_exposes_the_validation_detail() {
        let report = Report::new(KernelError::InvalidInput).attach_printable("title is too long");
        assert_eq!(ErrorStatus::from(report).message(), "title is too long");
    }
}
