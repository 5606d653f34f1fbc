//! Cloudways API data model

use crate::error::{CloudwaysError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Account credentials exchanged for an access token
///
/// The API key is kept in a `SecretString` so it never shows up in
/// `Debug` output or logs.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub api_key: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Create Credentials from `CLOUDWAYS_EMAIL` and `CLOUDWAYS_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// Use the explicit values where given, the environment otherwise
    pub fn resolve(email: Option<String>, api_key: Option<String>) -> Result<Self> {
        let email = match email {
            Some(email) => email,
            None => env_var("CLOUDWAYS_EMAIL")?,
        };
        let api_key = match api_key {
            Some(api_key) => api_key,
            None => env_var("CLOUDWAYS_API_KEY")?,
        };

        Ok(Self::new(email, api_key))
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| CloudwaysError::MissingEnvVar(name.to_string()))
}

/// Bearer token for a single client session
///
/// Expiry is owned by the provider and not tracked here.
#[derive(Debug)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Raw token value, for the `Authorization` header
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Numeric Cloudways server id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(u64);

impl ServerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ServerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ServerId {
    type Err = CloudwaysError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CloudwaysError::InvalidServerId(s.to_string()))
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Varnish service action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarnishAction {
    Enable,
    Disable,
    Purge,
}

impl VarnishAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarnishAction::Enable => "enable",
            VarnishAction::Disable => "disable",
            VarnishAction::Purge => "purge",
        }
    }
}

impl FromStr for VarnishAction {
    type Err = CloudwaysError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enable" => Ok(VarnishAction::Enable),
            "disable" => Ok(VarnishAction::Disable),
            "purge" => Ok(VarnishAction::Purge),
            _ => Err(CloudwaysError::InvalidAction(s.to_string())),
        }
    }
}

impl fmt::Display for VarnishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successfully submitted action
///
/// Only produced for `{"status": true}`; failures are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub completed: bool,
}

impl ActionResult {
    pub fn completed() -> Self {
        Self { completed: true }
    }
}

/// Snapshot of a remote operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_completed: bool,

    #[serde(
        default,
        deserialize_with = "deserialize_message",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,

    /// Remaining provider fields (id, type, timestamps, ...)
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

/// Body of `GET /operation/{id}`
///
/// Anything other than an object under `operation` decodes as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    #[serde(default, deserialize_with = "deserialize_operation")]
    pub operation: Option<Operation>,
}

/// Cloudways reports flags as `true`, `1` or `"1"` depending on the endpoint
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_u64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}

fn deserialize_message<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn deserialize_operation<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Operation>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
