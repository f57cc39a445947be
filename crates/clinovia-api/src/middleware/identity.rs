use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use clinovia_core::models::identity::Identity;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-clinovia-user-id";
pub const ORGANIZATION_HEADER: &str = "x-clinovia-org-id";

/// Identity middleware.
///
/// The upstream authorizer (API Gateway + Cognito) has already
/// authenticated the caller and forwards the user and organization ids as
/// headers. On success, inserts [`Identity`] into request extensions for
/// handlers to use.
pub async fn require_identity(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = identity_from_headers(req.headers())?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

pub fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, ApiError> {
    Ok(Identity {
        user_id: uuid_header(headers, USER_HEADER)?,
        organization_id: uuid_header(headers, ORGANIZATION_HEADER)?,
    })
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Result<Uuid, ApiError> {
    let value = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))?;
    Uuid::parse_str(value.trim())
        .map_err(|_| ApiError::Unauthorized(format!("{name} is not a valid id")))
}
