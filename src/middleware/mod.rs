pub mod auth;
pub mod error_handler;
pub mod request_id;

pub use auth::{
    ensure_owner, hash_token, Authenticator, BearerAuth, CurrentUser, MySqlTokenAuthenticator,
    StaticAuthenticator,
};
pub use request_id::RequestId;
