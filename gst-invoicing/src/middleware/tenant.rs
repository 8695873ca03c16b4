//! Caller identity extractor.
//!
//! The authenticating gateway in front of this service sets `X-Company-ID`,
//! `X-User-ID` and, optionally, `X-User-UID`. They are trusted as-is.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

pub const COMPANY_ID_HEADER: &str = "X-Company-ID";
pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_UID_HEADER: &str = "X-User-UID";

/// Tenant and actor of the current request.
#[derive(Debug, Clone)]
pub struct TenantContext {
    /// Tenant every read and write is scoped to.
    pub company_id: String,
    pub user_id: String,
    /// Display identifier recorded in audit entries; falls back to `user_id`.
    pub uid: String,
}

impl TenantContext {
    pub fn new(company_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            company_id: company_id.into(),
            uid: user_id.clone(),
            user_id,
        }
    }

    /// Identity written to audit entries.
    pub fn actor(&self) -> &str {
        &self.uid
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER).ok_or_else(|| {
            AppError::AuthError(anyhow::anyhow!("Missing {} header", USER_ID_HEADER))
        })?;

        let company_id = header(parts, COMPANY_ID_HEADER)
            .ok_or_else(|| AppError::bad_request("Tenant scope missing"))?;

        let uid = header(parts, USER_UID_HEADER).unwrap_or(user_id);

        let span = tracing::Span::current();
        span.record("company_id", company_id);
        span.record("user_id", user_id);

        Ok(TenantContext {
            company_id: company_id.to_string(),
            user_id: user_id.to_string(),
            uid: uid.to_string(),
        })
    }
}
