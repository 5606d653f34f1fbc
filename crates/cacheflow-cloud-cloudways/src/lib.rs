//! Cloudways provider for cacheflow
//!
//! Thin client for the Cloudways REST API that turns a fire-and-forget
//! Varnish action into a synchronous completion signal.
//!
//! # Features
//!
//! - Access token exchange (`POST /oauth/access_token`)
//! - Varnish service actions: enable, disable, purge (`POST /service/varnish`)
//! - Operation status polling (`GET /operation/{id}`) with a fixed-interval waiter
//!
//! # Requirements
//!
//! - Cloudways account email and API key (`CLOUDWAYS_EMAIL`, `CLOUDWAYS_API_KEY`)
//!
//! # Example
//!
//! ```ignore
//! use cacheflow_cloud_cloudways::{CloudwaysClient, Credentials, ServerId, VarnishAction, WaitConfig};
//!
//! let client = CloudwaysClient::new();
//! let credentials = Credentials::from_env()?;
//!
//! let token = client
//!     .obtain_access_token(&credentials.email, &credentials.api_key)
//!     .await?;
//! let result = client
//!     .execute_action(&token, ServerId::new(12345), VarnishAction::Purge)
//!     .await?;
//! assert!(result.completed);
//!
//! // Operation ids come from the Cloudways console or other API calls
//! let operation = client
//!     .wait_for_completion(&token, "98765", &WaitConfig::default())
//!     .await?;
//! println!("done: {:?}", operation.message);
//! ```

pub mod client;
pub mod error;
pub mod types;
pub mod waiter;

pub use client::{CLOUDWAYS_API_BASE, CloudwaysClient, CloudwaysConfig};
pub use error::{CloudwaysError, Result};
pub use types::{
    AccessToken, ActionResult, Credentials, Operation, OperationStatus, ServerId,
    VarnishAction,
};
pub use waiter::{Observation, WaitConfig, WaitProgress};
