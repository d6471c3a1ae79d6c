use serde::{Deserialize, Serialize};

use super::error::{AppError, ErrorCode, FieldIssue, Result};

/// Uniform success/failure envelope returned by every public operation
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "...", "code": "...", "issues": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<FieldIssue>>,
}

impl<T> ActionResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            issues: None,
        }
    }

    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.public_message()),
            code: Some(err.code()),
            issues: err.issues().map(|issues| issues.to_vec()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl ActionResult<()> {
    /// Success without a payload (e.g. deletions)
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            code: None,
            issues: None,
        }
    }
}

impl<T> From<Result<T>> for ActionResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => ActionResult::success(data),
            Err(err) => {
                if err.code() == ErrorCode::InternalError {
                    tracing::error!(error = %err, "Unexpected error");
                }
                ActionResult::failure(&err)
            }
        }
    }
}
