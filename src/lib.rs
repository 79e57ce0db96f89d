//! # mygeotab-rs
//!
//! An asynchronous Rust client for the MyGeotab JSON-RPC API. The client logs in
//! on first use, attaches the session to every call and, when the server reports
//! the session as expired, logs in again and repeats the call once.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mygeotab_rs::{Credentials, MyGeotabApi, MyGeotabClient, Params};
//! use serde_json::json;
//!
//! # async fn example() -> mygeotab_rs::Result<()> {
//! let credentials = Credentials::with_password("user@example.com", "password")?
//!     .in_database("my_company");
//! let client = MyGeotabClient::new(credentials);
//!
//! // All devices
//! let devices = client.get("Device", Params::new()).await?;
//!
//! // Trips for one device, at most 10
//! let mut search = Params::new();
//! search.insert("deviceSearch".to_string(), json!({"id": "b1"}));
//! search.insert("resultsLimit".to_string(), json!(10));
//! let trips = client.search("Trip", search).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`Config`] reads a `config.toml` file:
//!
//! ```toml
//! [mygeotab]
//! username = "user@example.com"
//! password = "password"
//! database = "my_company"
//! server = "my.geotab.com"
//! timeout_secs = 30
//! ```

pub mod api;
pub mod api_client;
pub mod codec;
pub mod config;
pub mod credentials;
pub mod dates;
pub mod dto;
pub mod error;

// Re-export commonly used types at the crate root
pub use api::{MyGeotabApi, Params};
pub use api_client::MyGeotabClient;
pub use codec::{Codec, JsonCodec};
pub use config::Config;
pub use credentials::Credentials;
pub use error::{Error, Result, ServerFault};
