use std::collections::HashMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use sha2::{Digest, Sha256};
use sqlx::MySqlPool;

use crate::core::AppError;

/// The authenticated caller, placed in request extensions by [`BearerAuth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
}

impl CurrentUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| AppError::unauthorized("Authentication required")),
        )
    }
}

/// Fails with `Forbidden` unless the caller owns the resource
pub fn ensure_owner(resource_user_id: &str, user: &CurrentUser) -> crate::core::Result<()> {
    if resource_user_id == user.user_id {
        Ok(())
    } else {
        Err(AppError::forbidden("You do not have access to this resource"))
    }
}

/// Resolves a bearer token to a user id
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> crate::core::Result<Option<String>>;
}

/// SHA-256 hex digest of a raw token, as stored in `api_tokens.token_hash`
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Looks tokens up by hash in the `api_tokens` table
pub struct MySqlTokenAuthenticator {
    pool: MySqlPool,
}

impl MySqlTokenAuthenticator {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Authenticator for MySqlTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> crate::core::Result<Option<String>> {
        let token_hash = hash_token(token);

        let user_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM api_tokens
            WHERE token_hash = ? AND revoked_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        if user_id.is_some() {
            // Best effort; a failed touch must not fail the request
            if let Err(e) =
                sqlx::query("UPDATE api_tokens SET last_used_at = NOW() WHERE token_hash = ?")
                    .bind(&token_hash)
                    .execute(&self.pool)
                    .await
            {
                tracing::warn!(error = %e, "Failed to update token last_used_at");
            }
        }

        Ok(user_id)
    }
}

/// Fixed token table, for tests and local runs
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    tokens: HashMap<String, String>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, token: &str) -> crate::core::Result<Option<String>> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// Routes reachable without a token
pub fn is_public_path(path: &str) -> bool {
    path == "/health"
        || path == "/ready"
        || path.starts_with("/public/")
        || path.starts_with("/guest/")
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Bearer token authentication middleware
pub struct BearerAuth {
    authenticator: Arc<dyn Authenticator>,
}

impl BearerAuth {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<BoxBody, B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

pub struct BearerAuthMiddleware<S> {
    service: Rc<S>,
    authenticator: Arc<dyn Authenticator>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<BoxBody, B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let authenticator = self.authenticator.clone();

        Box::pin(async move {
            if is_public_path(req.path()) {
                return svc.call(req).await.map(|res| res.map_into_right_body());
            }

            let outcome = match bearer_token(&req) {
                None => Err(AppError::unauthorized("Missing bearer token")),
                Some(token) => match authenticator.authenticate(&token).await {
                    Ok(Some(user_id)) => Ok(user_id),
                    Ok(None) => Err(AppError::unauthorized("Invalid token")),
                    Err(e) => Err(e),
                },
            };

            match outcome {
                Ok(user_id) => {
                    req.extensions_mut().insert(CurrentUser::new(user_id));
                    svc.call(req).await.map(|res| res.map_into_right_body())
                }
                Err(err) => {
                    tracing::debug!(path = %req.path(), error = %err, "Request rejected");
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_left_body())
                }
            }
        })
    }
}
