// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login-with-Amazon (LWA) token client.
//!
//! Two operations against the OAuth2 token endpoint: exchanging a
//! one-time authorization code, and refreshing with a long-lived refresh
//! token. No retry logic lives here; callers decide.

use serde::Deserialize;

use crate::error::AppError;

/// LWA OAuth2 token client.
#[derive(Clone)]
pub struct LwaClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

/// Token endpoint response for both grant types.
#[derive(Debug, Clone, Deserialize)]
pub struct LwaTokenResponse {
    pub access_token: String,
    /// LWA may rotate this on refresh; always persist the returned value.
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl LwaClient {
    pub fn new(token_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url,
            client_id,
            client_secret,
        }
    }

    /// Exchange a one-time authorization code from the OAuth redirect.
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<LwaTokenResponse, AppError> {
        self.token_request(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ],
            AppError::AuthExchange,
        )
        .await
    }

    /// Exchange a refresh token for a fresh access token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<LwaTokenResponse, AppError> {
        self.token_request(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ],
            AppError::TokenRefresh,
        )
        .await
    }

    async fn token_request(
        &self,
        form: &[(&str, &str)],
        wrap: fn(String) -> AppError,
    ) -> Result<LwaTokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| wrap(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "LWA token endpoint rejected request");
            return Err(wrap(body));
        }

        response
            .json()
            .await
            .map_err(|e| wrap(format!("failed to parse token response: {}", e)))
    }
}
