use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    web, Error, HttpRequest,
};

use crate::core::AppError;

/// Reject malformed JSON bodies with a `VALIDATION_ERROR` envelope
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    log_rejection(req, &err.to_string());
    AppError::validation(format!("Invalid request body: {}", err)).into()
}

/// Reject malformed query strings with a `VALIDATION_ERROR` envelope
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    log_rejection(req, &err.to_string());
    AppError::validation(format!("Invalid query string: {}", err)).into()
}

fn log_rejection(req: &HttpRequest, reason: &str) {
    tracing::debug!(
        method = %req.method(),
        path = %req.path(),
        reason = reason,
        "Request payload rejected"
    );
}

/// Extractor configs that route payload errors through the envelope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));
}
