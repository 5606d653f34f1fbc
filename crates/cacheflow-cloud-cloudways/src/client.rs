//! Cloudways API client
//!
//! Direct Cloudways REST implementation. Every call is a single attempt;
//! retrying is left to the caller, except for the operation waiter.

use crate::error::{CloudwaysError, Result};
use crate::types::{
    AccessToken, ActionResult, Credentials, OperationStatus, ServerId, VarnishAction,
};
use reqwest::Url;
use reqwest::header::USER_AGENT;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

pub const CLOUDWAYS_API_BASE: &str = "https://api.cloudways.com/api/v1";

const CLIENT_USER_AGENT: &str = concat!("cacheflow/", env!("CARGO_PKG_VERSION"));

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct CloudwaysConfig {
    pub api_base: String,
}

impl Default for CloudwaysConfig {
    fn default() -> Self {
        Self {
            api_base: CLOUDWAYS_API_BASE.to_string(),
        }
    }
}

impl CloudwaysConfig {
    /// Validate and normalize a base URL (trailing slashes are dropped)
    pub fn with_api_base(api_base: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into();
        let trimmed = api_base.trim().trim_end_matches('/');

        let url = Url::parse(trimmed)
            .map_err(|e| CloudwaysError::InvalidConfig(format!("api base {:?}: {}", api_base, e)))?;
        if url.cannot_be_a_base() {
            return Err(CloudwaysError::InvalidConfig(format!(
                "api base {:?} cannot carry a path",
                api_base
            )));
        }

        Ok(Self {
            api_base: trimmed.to_string(),
        })
    }
}

/// Cloudways API client
///
/// Holds no session state: the access token is passed explicitly on every
/// authenticated call.
pub struct CloudwaysClient {
    client: reqwest::Client,
    api_base: String,
}

impl Default for CloudwaysClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudwaysClient {
    /// Create a client against the public Cloudways endpoint
    pub fn new() -> Self {
        Self::with_config(CloudwaysConfig::default())
    }

    pub fn with_config(config: CloudwaysConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base,
        }
    }

    /// Get the base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| CloudwaysError::InvalidConfig(format!("api base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| CloudwaysError::InvalidConfig("api base cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Exchange account credentials for a bearer token
    ///
    /// Succeeds only when the body carries a non-empty `access_token` string.
    pub async fn obtain_access_token(
        &self,
        email: &str,
        api_key: &SecretString,
    ) -> Result<AccessToken> {
        let request_body = TokenRequest {
            email,
            api_key: api_key.expose_secret(),
        };

        tracing::debug!("Requesting access token for {}", email);

        let body = self
            .client
            .post(self.endpoint(&["oauth", "access_token"])?)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&request_body)
            .send()
            .await?
            .text()
            .await?;

        parse_token_response(&body)
    }

    /// Submit a Varnish action for a server
    pub async fn execute_action(
        &self,
        token: &AccessToken,
        server_id: ServerId,
        action: VarnishAction,
    ) -> Result<ActionResult> {
        let request_body = ActionRequest {
            server_id: server_id.get(),
            action,
        };

        tracing::debug!("Submitting varnish {} for server {}", action, server_id);

        let body = self
            .client
            .post(self.endpoint(&["service", "varnish"])?)
            .bearer_auth(token.expose())
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&request_body)
            .send()
            .await?
            .text()
            .await?;

        let result = parse_action_response(&body)?;
        tracing::info!("varnish {} on server {} completed", action, server_id);
        Ok(result)
    }

    /// Authenticate, then submit the action with the fresh token
    pub async fn run_action(
        &self,
        credentials: &Credentials,
        server_id: ServerId,
        action: VarnishAction,
    ) -> Result<ActionResult> {
        let token = self
            .obtain_access_token(&credentials.email, &credentials.api_key)
            .await?;
        self.execute_action(&token, server_id, action).await
    }

    /// Fetch the current status of an operation
    ///
    /// The body is decoded without shape checks; a missing or malformed
    /// `operation` object is left to the waiter to interpret.
    pub async fn get_operation_status(
        &self,
        token: &AccessToken,
        operation_id: &str,
    ) -> Result<OperationStatus> {
        let url = self.endpoint(&["operation", operation_id])?;

        tracing::debug!("Fetching status of operation {}", operation_id);

        let body = self
            .client
            .get(url)
            .bearer_auth(token.expose())
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?
            .text()
            .await?;

        Ok(serde_json::from_str(&body)?)
    }
}

fn parse_token_response(body: &str) -> Result<AccessToken> {
    let token = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("access_token")
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(AccessToken::new)
        });

    token.ok_or_else(|| CloudwaysError::AuthenticationFailed(body.to_string()))
}

/// Interpret a `/service/varnish` body
///
/// Checks run in a fixed order: failure flag, then success flag. The flags
/// win over any other field; every other shape is a protocol violation.
fn parse_action_response(body: &str) -> Result<ActionResult> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| CloudwaysError::UnexpectedResponse(body.to_string()))?;

    match value.get("status") {
        Some(Value::Bool(false)) => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            Err(CloudwaysError::OperationFailed(message.to_string()))
        }
        Some(Value::Bool(true)) => Ok(ActionResult::completed()),
        _ => Err(CloudwaysError::UnexpectedResponse(body.to_string())),
    }
}

// ============ API Types ============

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Serialize)]
struct ActionRequest {
    server_id: u64,
    action: VarnishAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> CloudwaysClient {
        let config = CloudwaysConfig::with_api_base(server.uri()).unwrap();
        CloudwaysClient::with_config(config)
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = CloudwaysConfig::with_api_base("https://api.example.com/v1/").unwrap();
        assert_eq!(config.api_base, "https://api.example.com/v1");
    }

    #[test]
    fn test_config_rejects_invalid_url() {
        assert!(matches!(
            CloudwaysConfig::with_api_base("not a url"),
            Err(CloudwaysError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_opaque_url() {
        assert!(matches!(
            CloudwaysConfig::with_api_base("mailto:ops@example.com"),
            Err(CloudwaysError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = CloudwaysClient::new();
        let url = client.endpoint(&["operation", "42"]).unwrap();
        assert_eq!(url.as_str(), "https://api.cloudways.com/api/v1/operation/42");

        let config = CloudwaysConfig::with_api_base("http://localhost:9999/").unwrap();
        let url = CloudwaysClient::with_config(config)
            .endpoint(&["oauth", "access_token"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9999/oauth/access_token");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = CloudwaysClient::new();
        let url = client.endpoint(&["operation", "a/b?c#d"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cloudways.com/api/v1/operation/a%2Fb%3Fc%23d"
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_parse_token_response() {
        let token = parse_token_response(r#"{"access_token":"abc123","expires_in":3600}"#).unwrap();
        assert_eq!(token.expose(), "abc123");
    }

    #[test]
    fn test_parse_token_response_without_token() {
        let bodies = [
            "{}",
            "null",
            r#"{"access_token":null}"#,
            r#"{"access_token":""}"#,
            r#"{"access_token":false}"#,
            r#"{"access_token":0}"#,
            r#"{"error":"invalid_credentials"}"#,
            "<html>Bad Gateway</html>",
        ];

        for body in bodies {
            match parse_token_response(body) {
                Err(CloudwaysError::AuthenticationFailed(raw)) => assert_eq!(raw, body),
                other => panic!("expected AuthenticationFailed for {}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_parse_action_failure() {
        match parse_action_response(r#"{"status":false,"message":"Server is stopped"}"#) {
            Err(CloudwaysError::OperationFailed(msg)) => assert_eq!(msg, "Server is stopped"),
            other => panic!("unexpected: {:?}", other),
        }

        match parse_action_response(r#"{"status":false}"#) {
            Err(CloudwaysError::OperationFailed(msg)) => assert_eq!(msg, "Unknown error"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_action_success_ignores_other_fields() {
        let result =
            parse_action_response(r#"{"status":true,"operation_id":"55","message":"x"}"#).unwrap();
        assert!(result.completed);
    }

    #[test]
    fn test_parse_action_failure_wins_over_operation_id() {
        assert!(matches!(
            parse_action_response(r#"{"status":false,"operation_id":"55"}"#),
            Err(CloudwaysError::OperationFailed(_))
        ));
    }

    #[test]
    fn test_parse_action_unexpected_shapes() {
        let bodies = [
            "{}",
            r#"{"status":"pending"}"#,
            r#"{"status":1}"#,
            r#"{"message":"hello"}"#,
            r#"{"operation_id":""}"#,
            r#"{"operation_id":"12345"}"#,
            r#"{"operation_id":678}"#,
            r#"{"status":null,"operation_id":"12345"}"#,
            "[]",
            "not json",
        ];

        for body in bodies {
            match parse_action_response(body) {
                Err(CloudwaysError::UnexpectedResponse(raw)) => assert_eq!(raw, body),
                other => panic!("expected UnexpectedResponse for {}, got {:?}", body, other),
            }
        }
    }

    #[tokio::test]
    async fn test_obtain_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .and(body_json(json!({"email": "me@example.com", "api_key": "key-1"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "token-xyz"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let token = client
            .obtain_access_token("me@example.com", &secret("key-1"))
            .await
            .unwrap();

        assert_eq!(token.expose(), "token-xyz");
    }

    #[tokio::test]
    async fn test_obtain_access_token_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        match client
            .obtain_access_token("me@example.com", &secret("wrong"))
            .await
        {
            Err(CloudwaysError::AuthenticationFailed(raw)) => {
                assert_eq!(raw, r#"{"error":"invalid_client"}"#)
            }
            other => panic!("expected AuthenticationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_action_sends_bearer_and_integer_server_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/service/varnish"))
            .and(header("Authorization", "Bearer token-xyz"))
            .and(body_json(json!({"server_id": 12345, "action": "purge"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client
            .execute_action(
                &AccessToken::new("token-xyz"),
                ServerId::new(12345),
                VarnishAction::Purge,
            )
            .await
            .unwrap();

        assert_eq!(result, ActionResult::completed());
    }

    #[tokio::test]
    async fn test_execute_action_failure_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/service/varnish"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"status": false, "message": "Invalid server"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .execute_action(&AccessToken::new("t"), ServerId::new(1), VarnishAction::Enable)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudwaysError::OperationFailed(ref msg) if msg == "Invalid server"));
    }

    #[tokio::test]
    async fn test_get_operation_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/operation/777"))
            .and(header("Authorization", "Bearer token-xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"operation": {"is_completed": true, "message": "Varnish purged"}}),
            ))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let token = AccessToken::new("token-xyz");

        let first = client.get_operation_status(&token, "777").await.unwrap();
        let second = client.get_operation_status(&token, "777").await.unwrap();

        assert_eq!(first, second);
        let operation = first.operation.unwrap();
        assert!(operation.is_completed);
        assert_eq!(operation.message.as_deref(), Some("Varnish purged"));
    }

    #[tokio::test]
    async fn test_execute_action_rejects_operation_id_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/service/varnish"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"operation_id":"12345"}"#))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        match client
            .execute_action(&AccessToken::new("t"), ServerId::new(1), VarnishAction::Purge)
            .await
        {
            Err(CloudwaysError::UnexpectedResponse(raw)) => {
                assert_eq!(raw, r#"{"operation_id":"12345"}"#)
            }
            other => panic!("expected UnexpectedResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_action_authenticates_then_executes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/service/varnish"))
            .and(header("Authorization", "Bearer tok"))
            .and(body_json(json!({"server_id": 9, "action": "disable"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let credentials = Credentials::new("me@example.com", "key");
        let result = client
            .run_action(&credentials, ServerId::new(9), VarnishAction::Disable)
            .await
            .unwrap();

        assert!(result.completed);
    }

    #[tokio::test]
    async fn test_run_action_stops_on_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/service/varnish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let credentials = Credentials::new("me@example.com", "bad");
        let err = client
            .run_action(&credentials, ServerId::new(1), VarnishAction::Purge)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudwaysError::AuthenticationFailed(ref raw) if raw == "denied"));
    }

    #[tokio::test]
    async fn test_get_operation_status_encodes_operation_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/operation/a%2Fb%3Fc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"operation": {"is_completed": true}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let status = client
            .get_operation_status(&AccessToken::new("t"), "a/b?c")
            .await
            .unwrap();

        assert!(status.operation.unwrap().is_completed);
    }

    #[tokio::test]
    async fn test_get_operation_status_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/operation/1"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get_operation_status(&AccessToken::new("t"), "1")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudwaysError::Json(_)));
    }
}
