// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Amazon OAuth authorization routes.
//!
//! `GET /auth/amazon` (authenticated) redirects to the Seller Central
//! consent page; `GET /auth/amazon/callback` (public) finishes the flow.
//! The `state` parameter carries the initiating user id, HMAC-signed so
//! the callback can bind the authorization to that user and fail closed
//! on mismatch or tampering.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Extension, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::{verify_jwt, AuthUser, SESSION_COOKIE};
use crate::AppState;
use axum_extra::extract::cookie::CookieJar;

/// Seller Central consent page for app authorization.
const CONSENT_URL: &str = "https://sellercentral.amazon.com/apps/authorize/consent";

type HmacSha256 = Hmac<Sha256>;

/// Routes reachable without a session (the OAuth redirect target).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/amazon/callback", get(auth_callback))
}

/// Routes requiring an authenticated session.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/amazon", get(auth_start))
}

/// Start the OAuth flow - redirect to the Seller Central consent page.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: axum::http::HeaderMap,
) -> Result<Redirect> {
    let oauth_state = sign_state(&user.user_id, &state.config.oauth_state_key)?;
    let callback_url = callback_url(&headers);

    let auth_url = format!(
        "{}?application_id={}&state={}&redirect_uri={}&version=beta",
        CONSENT_URL,
        state.config.lwa_app_id,
        oauth_state,
        urlencoding::encode(&callback_url),
    );

    tracing::info!(
        user_id = %user.user_id,
        app_id = %state.config.lwa_app_id,
        "Starting Amazon OAuth flow"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    spapi_oauth_code: Option<String>,
    state: String,
    #[serde(default)]
    selling_partner_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code, persist the connection, and
/// redirect back to the settings page.
///
/// Never surfaces JSON errors: every failure path redirects to the
/// frontend with an `error` query parameter.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let settings_url = format!("{}/settings", state.config.frontend_url);

    let Some(user_id) = verify_and_decode_state(&params.state, &state.config.oauth_state_key)
    else {
        tracing::warn!("Invalid or tampered OAuth state parameter");
        return Redirect::temporary(&format!("{}?error=invalid_state", settings_url));
    };

    // Fail closed: when the browser carries a session, it must belong to
    // the user who started the flow.
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match verify_jwt(cookie.value(), &state.config.jwt_signing_key) {
            Some(session_user) if session_user == user_id => {}
            _ => {
                tracing::warn!(user_id = %user_id, "OAuth state does not match session identity");
                return Redirect::temporary(&format!("{}?error=identity_mismatch", settings_url));
            }
        }
    }

    if let Some(error) = params.error {
        tracing::warn!(user_id = %user_id, error = %error, "OAuth error from Amazon");
        return Redirect::temporary(&format!("{}?error={}", settings_url, error));
    }

    let Some(code) = params.spapi_oauth_code else {
        return Redirect::temporary(&format!("{}?error=missing_code", settings_url));
    };

    let callback_url = callback_url(&headers);
    match state
        .amazon
        .handle_oauth_callback(
            &user_id,
            &code,
            &callback_url,
            params.selling_partner_id.as_deref(),
        )
        .await
    {
        Ok(_) => {
            tracing::info!(user_id = %user_id, "Amazon OAuth successful");
            Redirect::temporary(&format!("{}?connected=amazon", settings_url))
        }
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Amazon OAuth callback failed");
            Redirect::temporary(&format!("{}?error=exchange_failed", settings_url))
        }
    }
}

/// Reconstruct this service's callback URL from the request headers.
fn callback_url(headers: &axum::http::HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/amazon/callback", scheme, host)
}

/// Sign `user_id|timestamp_hex` and base64url-encode the result.
fn sign_state(user_id: &str, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{}|{:x}", user_id, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature and decode the user id from the OAuth state.
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "user_id|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let user_id = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    let payload = format!("{}|{}", user_id, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(user_id.to_string())
}
