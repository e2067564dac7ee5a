//! Admin token check for moderation endpoints.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::state::AppState;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Extractor that admits only requests carrying the configured admin token.
///
/// A missing header is a 422 (required header); a wrong token is a 401.
#[derive(Debug)]
pub struct RequireAdmin;

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .ok_or_else(|| ApiError::Unprocessable(format!("missing {ADMIN_TOKEN_HEADER} header")))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized)?;

        if provided != state.admin_token {
            return Err(ApiError::Unauthorized);
        }
        Ok(Self)
    }
}
