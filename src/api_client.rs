use crate::api::{MyGeotabApi, Params};
use crate::codec::{Codec, JsonCodec};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::dto::rpc::{decode_fault, AuthenticateResult, RpcRequest, RpcResponse};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

const API_PATH: &str = "apiv1";
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
/// `path` value meaning the database lives on the server that was asked.
const THIS_SERVER: &str = "ThisServer";

/// Asynchronous client for the MyGeotab JSON-RPC API.
///
/// The client logs in lazily on the first call and, when the server reports the
/// session as invalid, logs in again and repeats the call once.
///
/// All methods take `&self`, so one client can be shared between tasks. The
/// current [`Credentials`] are kept as an `Arc` snapshot that authentication
/// swaps out as a whole. Concurrent calls are not serialised against each other:
/// two calls hitting an expired session may both re-authenticate, and the last
/// session issued wins.
pub struct MyGeotabClient {
    client: Client,
    codec: Arc<dyn Codec>,
    credentials: RwLock<Arc<Credentials>>,
}

impl MyGeotabClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            codec: Arc::new(JsonCodec),
            credentials: RwLock::new(Arc::new(credentials)),
        }
    }

    /// Build a client from the `[mygeotab]` section of a config file.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = config.mygeotab.credentials()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.mygeotab.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(credentials).with_http_client(builder.build()?))
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS settings).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Snapshot of the credentials currently in use.
    pub fn credentials(&self) -> Arc<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the credentials, e.g. to restore a saved session.
    pub fn set_credentials(&self, credentials: Credentials) {
        self.replace_credentials(Arc::new(credentials));
    }

    fn replace_credentials(&self, credentials: Arc<Credentials>) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    /// Endpoint for the server the current credentials point at.
    pub fn api_url(&self) -> String {
        api_url(self.credentials().server())
    }

    /// Log in with the stored username and password.
    ///
    /// On success the stored credentials are replaced with the session the
    /// server issued, on the server that owns the database.
    pub async fn authenticate(&self) -> Result<Arc<Credentials>> {
        let current = self.credentials();

        let mut params = Params::new();
        params.insert("database".to_string(), json!(current.database()));
        params.insert("userName".to_string(), json!(current.username()));
        params.insert("password".to_string(), json!(current.password()));
        params.insert("global".to_string(), Value::Bool(true));

        info!(
            "Authenticating {} on {} (database: {:?})",
            current.username(),
            current.server(),
            current.database()
        );

        let result = match self.query("Authenticate", &params).await {
            Ok(result) => result,
            Err(Error::Server(fault)) if fault.is_invalid_user() => {
                warn!("Authentication rejected for {}: {}", current.username(), fault);
                return Err(Error::Authentication {
                    username: current.username().to_string(),
                    database: current.database().map(str::to_string),
                    server: current.server().to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        let result = result.ok_or_else(|| {
            Error::UnexpectedResponse("Authenticate returned no result".to_string())
        })?;
        let result: AuthenticateResult = serde_json::from_value(result)?;

        let server = if result.path == THIS_SERVER {
            current.server().to_string()
        } else {
            result.path
        };
        let renewed = Arc::new(current.renewed(
            result.credentials.user_name,
            result.credentials.session_id,
            result.credentials.database,
            server,
        ));
        self.replace_credentials(renewed.clone());

        info!(
            "Authenticated {} on {} (database: {:?})",
            renewed.username(),
            renewed.server(),
            renewed.database()
        );
        Ok(renewed)
    }

    /// Make a call to the API.
    ///
    /// `type_name` is sent as `typeName` for generic methods such as `Get`. A
    /// `null` result is returned as `Ok(None)`.
    pub async fn call(
        &self,
        method: &str,
        type_name: Option<&str>,
        params: Params,
    ) -> Result<Option<Value>> {
        if method.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Must specify a method name".to_string(),
            ));
        }

        let mut params = params;
        if let Some(type_name) = type_name.filter(|t| !t.is_empty()) {
            params.insert("typeName".to_string(), Value::String(type_name.to_string()));
        }

        if !self.credentials().is_authenticated() {
            self.authenticate().await?;
        }

        let mut reauthorized = false;
        loop {
            let request_params = self.attach_credentials(&params);
            match self.query(method, &request_params).await {
                Err(err) if err.is_invalid_user() && !reauthorized => {
                    warn!("Session rejected during {}, re-authenticating", method);
                    reauthorized = true;
                    self.authenticate().await?;
                }
                result => return result,
            }
        }
    }

    /// [`call`](Self::call) and decode the result into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        type_name: Option<&str>,
        params: Params,
    ) -> Result<Option<T>> {
        let result = self.call(method, type_name, params).await?;
        Ok(result.map(serde_json::from_value::<T>).transpose()?)
    }

    fn attach_credentials(&self, params: &Params) -> Params {
        let mut params = params.clone();
        if !params.contains_key("credentials") {
            let credentials = self.credentials();
            if credentials.is_authenticated() {
                params.insert("credentials".to_string(), credentials.as_params());
            }
        }
        params
    }

    /// Send one request envelope and classify the response.
    async fn query(&self, method: &str, params: &Params) -> Result<Option<Value>> {
        let envelope = serde_json::to_value(RpcRequest::new(method, params))?;
        let body = self.codec.serialize(&envelope)?;
        let url = self.api_url();

        debug!("API request: {} {}", method, url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        debug!("API response status: {}", status);

        let response_text = response.text().await?;

        let payload = match self.codec.deserialize(&response_text) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(Error::Http {
                    status: status.as_u16(),
                    body: response_text,
                });
            }
            Err(err) => return Err(err),
        };

        if !status.is_success() && payload.get("error").map_or(true, Value::is_null) {
            return Err(Error::Http {
                status: status.as_u16(),
                body: response_text,
            });
        }

        process_response(payload)
    }
}

#[async_trait]
impl MyGeotabApi for MyGeotabClient {
    async fn authenticate(&self) -> Result<Arc<Credentials>> {
        MyGeotabClient::authenticate(self).await
    }

    async fn call(
        &self,
        method: &str,
        type_name: Option<&str>,
        params: Params,
    ) -> Result<Option<Value>> {
        MyGeotabClient::call(self, method, type_name, params).await
    }
}

/// `https://<server>/apiv1`, keeping an explicit scheme if the server has one.
pub fn api_url(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.contains("://") {
        format!("{server}/{API_PATH}")
    } else {
        format!("https://{server}/{API_PATH}")
    }
}

fn process_response(payload: Value) -> Result<Option<Value>> {
    if !payload.is_object() {
        return Err(Error::UnexpectedResponse(format!(
            "expected a JSON object, got {payload}"
        )));
    }
    let response: RpcResponse = serde_json::from_value(payload)?;
    if let Some(error) = response.error {
        let fault = decode_fault(error);
        debug!("API fault: {}", fault);
        return Err(Error::Server(fault));
    }
    Ok(response.result)
}
