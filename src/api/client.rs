//! HTTP gateway to the tracker backend.
//!
//! One client instance serves all three record types. The client keeps no
//! state of its own beyond the base URL; authentication lives in the token
//! store so a restart picks up the previous session.

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::auth::{BearerToken, StoredSession, TokenStore};
use crate::clock::{Clock, SystemClock};
use crate::config::ResolvedConfig;
use crate::models::{Category, Expense, Income};

use super::ApiError;

/// Client for the backend's login and per-type CRUD endpoints.
///
/// Every data call reads the saved session and attaches its bearer token;
/// when the token's expiry claim has passed, the client re-runs login with
/// the stored credentials and persists the fresh token before proceeding.
pub struct ApiClient {
    base_url: String,
    client: Client,
    tokens: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
            tokens,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build a client from resolved configuration: the base URL comes from
    /// `server_url` and the request timeout from `[http] timeout`.
    pub fn from_config(
        config: &ResolvedConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> anyhow::Result<Self> {
        let server_url = config
            .server_url
            .clone()
            .context("server_url is not configured")?;
        let client = Client::builder()
            .timeout(config.http.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::new(server_url, tokens).with_client(client))
    }

    /// Override the HTTP client, e.g. to apply the configured timeout.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Log in with the given credentials and persist the session so later
    /// calls can authenticate.
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<(), ApiError> {
        let token = self.login(email, password.expose_secret()).await?;
        let session = StoredSession::new(email, password.expose_secret(), token.reveal());
        self.tokens.save(&session).map_err(store_error)?;
        Ok(())
    }

    /// Drop the saved session.
    pub fn sign_out(&self) -> Result<(), ApiError> {
        self.tokens.clear().map_err(store_error)
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("/categories", None).await
    }

    pub async fn create_category(&self, category: &Category) -> Result<Category, ApiError> {
        self.post_json("/categories".to_string(), category).await
    }

    pub async fn update_category(&self, id: i64, category: &Category) -> Result<Category, ApiError> {
        self.put_json(format!("/categories/{id}"), category).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        self.delete(format!("/categories/{id}")).await
    }

    // Expenses

    /// List expenses, optionally restricted to dates at or after `from`.
    pub async fn list_expenses(&self, from: Option<NaiveDate>) -> Result<Vec<Expense>, ApiError> {
        self.get_json("/expenses", from).await
    }

    pub async fn create_expense(&self, expense: &Expense) -> Result<Expense, ApiError> {
        self.post_json("/expenses".to_string(), expense).await
    }

    pub async fn update_expense(&self, id: i64, expense: &Expense) -> Result<Expense, ApiError> {
        self.put_json(format!("/expenses/{id}"), expense).await
    }

    pub async fn delete_expense(&self, id: i64) -> Result<(), ApiError> {
        self.delete(format!("/expenses/{id}")).await
    }

    // Incomes

    /// List incomes, optionally restricted to dates at or after `from`.
    pub async fn list_incomes(&self, from: Option<NaiveDate>) -> Result<Vec<Income>, ApiError> {
        self.get_json("/incomes", from).await
    }

    pub async fn create_income(&self, income: &Income) -> Result<Income, ApiError> {
        self.post_json("/incomes".to_string(), income).await
    }

    pub async fn update_income(&self, id: i64, income: &Income) -> Result<Income, ApiError> {
        self.put_json(format!("/incomes/{id}"), income).await
    }

    pub async fn delete_income(&self, id: i64) -> Result<(), ApiError> {
        self.delete(format!("/incomes/{id}")).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn login(&self, email: &str, password: &str) -> Result<BearerToken, ApiError> {
        #[derive(Serialize)]
        struct Request<'a> {
            email: &'a str,
            password: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            token: String,
        }

        let response = self
            .client
            .post(self.url("/login"))
            .json(&Request { email, password })
            .send()
            .await
            .map_err(transport_error)?;

        let response: Response = parse(check_status(response).await?).await?;
        Ok(BearerToken::parse(response.token))
    }

    /// Current bearer token, re-logging-in when the stored one has expired.
    async fn bearer(&self) -> Result<String, ApiError> {
        let session = self
            .tokens
            .load()
            .map_err(store_error)?
            .ok_or_else(|| ApiError::Other {
                detail: "not signed in".to_string(),
            })?;

        let token = BearerToken::parse(session.token.clone());
        if !token.is_expired(self.clock.now()) {
            return Ok(session.token);
        }

        tracing::debug!(email = %session.email, "Bearer token expired; signing in again");
        let fresh = self.login(&session.email, &session.password).await?;
        let refreshed = session.with_token(fresh.reveal());
        self.tokens.save(&refreshed).map_err(store_error)?;
        Ok(refreshed.token)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let token = self.bearer().await?;
        let response = builder
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        from: Option<NaiveDate>,
    ) -> Result<T, ApiError> {
        let mut builder = self.client.get(self.url(path));
        if let Some(from) = from {
            builder = builder.query(&[("from", from.to_string())]);
        }
        parse(self.send(builder).await?).await
    }

    async fn post_json<T, B>(&self, path: String, body: &B) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + Sync,
    {
        let builder = self.client.post(self.url(&path)).json(body);
        parse(self.send(builder).await?).await
    }

    async fn put_json<T, B>(&self, path: String, body: &B) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + Sync,
    {
        let builder = self.client.put(self.url(&path)).json(body);
        parse(self.send(builder).await?).await
    }

    async fn delete(&self, path: String) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(&path))).await?;
        Ok(())
    }
}

/// Map non-2xx statuses onto the error taxonomy.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::FORBIDDEN => ApiError::ValidationRejected {
            message: validation_message(&body),
        },
        _ => ApiError::Other {
            detail: format!("{status}: {body}"),
        },
    })
}

async fn parse<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|err| ApiError::Other {
        detail: format!("invalid response body: {err}"),
    })
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::ConnectionTimeout
    } else if err.is_connect() {
        ApiError::UnknownHost
    } else {
        ApiError::Other {
            detail: err.to_string(),
        }
    }
}

fn store_error(err: anyhow::Error) -> ApiError {
    ApiError::Other {
        detail: format!("{err:#}"),
    }
}

/// 403 bodies carry `{"message": "..."}` when the server explains itself;
/// fall back to the raw text so the server's wording always comes through.
fn validation_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Message {
        message: String,
    }

    serde_json::from_str::<Message>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::config::HttpConfig;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed_in_client(server_uri: &str) -> ApiClient {
        let tokens = MemoryTokenStore::with_session(StoredSession::new("a@b.c", "pw", "t0k3n"));
        ApiClient::new(server_uri, Arc::new(tokens))
    }

    #[tokio::test]
    async fn attaches_bearer_token_to_data_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .and(header("Authorization", "Bearer t0k3n"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Groceries", "usageCount": 4}
            ])))
            .mount(&server)
            .await;

        let categories = signed_in_client(&server.uri())
            .list_categories()
            .await
            .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Groceries");
    }

    #[tokio::test]
    async fn passes_the_window_start_as_a_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses"))
            .and(query_param("from", "2024-05-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let expenses = signed_in_client(&server.uri())
            .list_expenses(Some("2024-05-01".parse().unwrap()))
            .await
            .unwrap();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/expenses/42"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = signed_in_client(&server.uri())
            .delete_expense(42)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[tokio::test]
    async fn validation_rejection_carries_the_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "category name already in use"
            })))
            .mount(&server)
            .await;

        let err = signed_in_client(&server.uri())
            .create_category(&Category::new("Groceries"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::ValidationRejected {
                message: "category name already in use".to_string()
            }
        );
    }

    #[tokio::test]
    async fn other_statuses_map_to_the_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/incomes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = signed_in_client(&server.uri())
            .list_incomes(None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Other { .. }));
    }

    #[tokio::test]
    async fn the_configured_timeout_maps_slow_responses_to_connection_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = ResolvedConfig {
            server_url: Some(server.uri()),
            data_dir: std::env::temp_dir(),
            http: HttpConfig {
                timeout: Duration::from_millis(200),
            },
        };
        let tokens = MemoryTokenStore::with_session(StoredSession::new("a@b.c", "pw", "t0k3n"));
        let client = ApiClient::from_config(&config, Arc::new(tokens)).unwrap();

        let err = client.list_categories().await.unwrap_err();
        assert_eq!(err, ApiError::ConnectionTimeout);
    }

    #[tokio::test]
    async fn an_unreachable_server_maps_to_unknown_host() {
        // Discard port; nothing listens there, so the connection is refused.
        let err = signed_in_client("http://127.0.0.1:9")
            .list_categories()
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::UnknownHost);
    }

    #[test]
    fn building_from_config_requires_a_server_url() {
        let config = ResolvedConfig {
            server_url: None,
            data_dir: std::env::temp_dir(),
            http: HttpConfig::default(),
        };
        let result = ApiClient::from_config(&config, Arc::new(MemoryTokenStore::new()));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn data_calls_without_a_session_fail_without_hitting_the_network() {
        let client = ApiClient::new("http://localhost:1", Arc::new(MemoryTokenStore::new()));
        let err = client.list_categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Other { .. }));
    }

    #[tokio::test]
    async fn sign_in_persists_the_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "fresh-token"
            })))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::new());
        let client = ApiClient::new(server.uri(), tokens.clone());
        client
            .sign_in("a@b.c", &SecretString::from("pw".to_string()))
            .await
            .unwrap();

        let session = tokens.load().unwrap().expect("session saved");
        assert_eq!(session.email, "a@b.c");
        assert_eq!(session.token, "fresh-token");
    }

    #[test]
    fn sign_out_clears_the_stored_session() {
        let tokens = Arc::new(MemoryTokenStore::with_session(StoredSession::new(
            "a@b.c", "pw", "t0k3n",
        )));
        let client = ApiClient::new("http://localhost:1", tokens.clone());

        client.sign_out().unwrap();
        assert!(tokens.load().unwrap().is_none());
    }

    #[test]
    fn validation_message_falls_back_to_raw_body() {
        assert_eq!(validation_message("plain words"), "plain words");
        assert_eq!(
            validation_message(r#"{"message": "structured words"}"#),
            "structured words"
        );
    }
}
