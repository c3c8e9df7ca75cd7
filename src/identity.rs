use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header set by the fronting auth provider once it has verified the session.
pub const USER_HEADER: &str = "x-user-id";

/// Caller identity; `None` for anonymous requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub Option<String>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(CurrentUser(user))
    }
}
