//! Too Good To Go API client

pub mod models;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, COOKIE, SET_COOKIE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::application::errors::ApiError;
use crate::domain::entities::{Credentials, StoreSnapshot};
use crate::domain::traits::{Marketplace, Session};
use crate::infrastructure::config::MarketplaceConfig;
use models::{
    AuthByEmailRequest, AuthByEmailResponse, ItemsRequest, ItemsResponse, PollingRequest, PollingResponse,
    RefreshRequest, RefreshResponse,
};

const AUTH_BY_EMAIL_ENDPOINT: &str = "auth/v5/authByEmail";
const AUTH_POLLING_ENDPOINT: &str = "auth/v5/authByRequestPollingId";
const REFRESH_ENDPOINT: &str = "auth/v5/token/refresh";
const ITEM_ENDPOINT: &str = "item/v8/";
const DEVICE_TYPE: &str = "ANDROID";

/// Thin client for the endpoints the notifier needs
pub struct TgtgClient {
    client: Client,
    config: MarketplaceConfig,
}

impl TgtgClient {
    pub fn new(config: MarketplaceConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::other(None, e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    fn token_lifetime(&self) -> Duration {
        Duration::seconds(self.config.access_token_lifetime_secs)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        access_token: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self
            .client
            .post(self.url(endpoint))
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, self.config.language.as_str())
            .json(body);

        if let Some(token) = access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
            request = request.header(COOKIE, cookie);
        }

        tracing::debug!("POST {}", endpoint);
        request
            .send()
            .await
            .map_err(|e| ApiError::other(e.status().map(|s| s.as_u16()), e.to_string()))
    }

    async fn refresh(&self, session: &mut Session) -> Result<(), ApiError> {
        let now = Utc::now();
        if !session.needs_refresh(now, self.token_lifetime()) {
            return Ok(());
        }

        let request = RefreshRequest {
            refresh_token: &session.credentials.refresh_token,
        };
        let response = self
            .post(REFRESH_ENDPOINT, &request, None, Some(&session.credentials.cookie))
            .await?;
        let response = ensure_success(response).await?;
        let cookie = session_cookie(response.headers());
        let tokens: RefreshResponse = parse_json(response).await?;

        session.credentials.access_token = tokens.access_token;
        session.credentials.refresh_token = tokens.refresh_token;
        if let Some(cookie) = cookie {
            session.credentials.cookie = cookie;
        }
        session.refreshed_at = Some(now);

        tracing::debug!("Refreshed access token for user {}", session.credentials.user_id);
        Ok(())
    }

    async fn poll_login(&self, email: &str, polling_id: &str, mut cookie: Option<String>) -> Result<Credentials, ApiError> {
        let interval = std::time::Duration::from_secs(self.config.polling_interval_secs);

        for attempt in 1..=self.config.max_polling_attempts {
            let request = PollingRequest {
                device_type: DEVICE_TYPE,
                email,
                request_polling_id: polling_id,
            };
            let response = self
                .post(AUTH_POLLING_ENDPOINT, &request, None, cookie.as_deref())
                .await?;

            if response.status() == StatusCode::ACCEPTED {
                tracing::info!(
                    "Waiting for {} to confirm the login email (attempt {}/{})",
                    email,
                    attempt,
                    self.config.max_polling_attempts
                );
                tokio::time::sleep(interval).await;
                continue;
            }

            let response = ensure_success(response).await?;
            if let Some(fresh) = session_cookie(response.headers()) {
                cookie = Some(fresh);
            }
            let login: PollingResponse = parse_json(response).await?;
            let user_id = models::coerce_user_id(&login.startup_data.user.user_id)
                .ok_or_else(|| ApiError::other(None, "login response without user id"))?;

            return Ok(Credentials {
                access_token: login.access_token,
                refresh_token: login.refresh_token,
                user_id,
                cookie: cookie.unwrap_or_default(),
            });
        }

        Err(ApiError::other(
            None,
            format!("login for {} not confirmed after {} attempts", email, self.config.max_polling_attempts),
        ))
    }
}

#[async_trait]
impl Marketplace for TgtgClient {
    async fn login(&self, email: &str) -> Result<Credentials, ApiError> {
        let request = AuthByEmailRequest {
            device_type: DEVICE_TYPE,
            email,
        };
        let response = self.post(AUTH_BY_EMAIL_ENDPOINT, &request, None, None).await?;
        let response = ensure_success(response).await?;
        let cookie = session_cookie(response.headers());
        let auth: AuthByEmailResponse = parse_json(response).await?;

        match auth.state.as_str() {
            "WAIT" => {
                let polling_id = auth
                    .polling_id
                    .ok_or_else(|| ApiError::other(None, "login response without polling id"))?;
                self.poll_login(email, &polling_id, cookie).await
            }
            "TERMS" => Err(ApiError::other(
                None,
                format!("{} is not linked to an account, sign up in the app first", email),
            )),
            state => Err(ApiError::other(None, format!("unexpected login state {}", state))),
        }
    }

    async fn get_items(&self, session: &mut Session) -> Result<Vec<StoreSnapshot>, ApiError> {
        self.refresh(session).await?;

        let page_size = self.config.page_size.max(1);
        let mut snapshots = Vec::new();
        let mut page = 1;

        loop {
            let request = ItemsRequest::favorites(&session.credentials.user_id, page, page_size);
            let response = self
                .post(
                    ITEM_ENDPOINT,
                    &request,
                    Some(&session.credentials.access_token),
                    Some(&session.credentials.cookie),
                )
                .await?;
            let response = ensure_success(response).await?;
            let body: ItemsResponse = parse_json(response).await?;

            let count = body.items.len();
            for item in body.items {
                snapshots.push(item.into_snapshot()?);
            }

            if count < page_size as usize {
                break;
            }
            page += 1;
        }

        tracing::debug!("Fetched {} favorites for user {}", snapshots.len(), session.credentials.user_id);
        Ok(snapshots)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), &body))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    response
        .json()
        .await
        .map_err(|e| ApiError::other(Some(status), format!("invalid response: {}", e)))
}

/// Cookie header value built from every `Set-Cookie` of a response
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

#[cfg(test)]
mod tests;
