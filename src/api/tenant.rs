//! Per-request actor context.
//!
//! Session issuance lives in the accounts service; by the time a
//! request reaches this core the caller is identified by the
//! `X-Account-Id` header. The boundary resolves that to a
//! [`TenantContext`] once per request so no handler reaches for
//! ambient auth state.
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::extract::{ConnectInfo, FromRequestParts};
use http::request::Parts;

use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::audit::ClientFingerprint;
use crate::directory;

type SharedState = Arc<RwLock<AppState>>;

pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// The acting account and the tenant whose team roster applies to it.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub actor_id: String,
    pub effective_tenant_id: String,
    pub role: String,
}

impl FromRequestParts<SharedState> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(ACCOUNT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .ok_or(ApiError::Unauthorized)?;

        let db = state.read().expect("Unable to read shared state").db.clone();
        let account = directory::account_by_id(&db, &actor_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        let (effective_tenant_id, role) = directory::effective_tenant(&db, &account.id).await?;

        Ok(Self {
            actor_id: account.id,
            effective_tenant_id,
            role,
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientFingerprint {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        // First hop of the forwarded-for chain, then the proxy's
        // real-ip header, then the raw socket address
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|value| value.to_str().ok())
                    .map(|value| value.to_string())
            })
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip().to_string())
            });

        let user_agent = headers
            .get(http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        Ok(Self { ip, user_agent })
    }
}
