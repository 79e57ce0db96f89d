//! The call surface shared by MyGeotab clients.
//!
//! Implementors supply [`MyGeotabApi::authenticate`] and [`MyGeotabApi::call`];
//! the entity shortcuts and multi-call batching are built on top of `call`.

use crate::credentials::Credentials;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Named parameters of an RPC call.
pub type Params = Map<String, Value>;

pub const GET: &str = "Get";
pub const ADD: &str = "Add";
pub const SET: &str = "Set";
pub const REMOVE: &str = "Remove";
pub const EXECUTE_MULTI_CALL: &str = "ExecuteMultiCall";

const RESULTS_LIMIT: &str = "resultsLimit";

#[async_trait]
pub trait MyGeotabApi: Send + Sync {
    async fn authenticate(&self) -> Result<Arc<Credentials>>;

    async fn call(
        &self,
        method: &str,
        type_name: Option<&str>,
        params: Params,
    ) -> Result<Option<Value>>;

    /// Run several calls in one request.
    ///
    /// Each entry is a method name and its parameters, e.g.
    /// `("Get".into(), params)`. The server answers with one result per call, in order.
    async fn multi_call(&self, calls: Vec<(String, Params)>) -> Result<Option<Value>> {
        let calls: Vec<Value> = calls
            .into_iter()
            .map(|(method, params)| json!({"method": method, "params": params}))
            .collect();

        let mut params = Params::new();
        params.insert("calls".to_string(), Value::Array(calls));
        self.call(EXECUTE_MULTI_CALL, None, params).await
    }

    /// Get entities of `type_name`.
    async fn get(&self, type_name: &str, params: Params) -> Result<Option<Value>> {
        self.call(GET, Some(type_name), params).await
    }

    /// Get entities matching a search.
    ///
    /// `resultsLimit` is lifted out of `params`; everything else becomes the
    /// `search` object. With no parameters this is a plain [`get`](Self::get).
    async fn search(&self, type_name: &str, params: Params) -> Result<Option<Value>> {
        if params.is_empty() {
            return self.get(type_name, Params::new()).await;
        }

        let mut search = params;
        let results_limit = search.remove(RESULTS_LIMIT).unwrap_or(Value::Null);

        let mut params = Params::new();
        params.insert(RESULTS_LIMIT.to_string(), results_limit);
        params.insert("search".to_string(), Value::Object(search));
        self.call(GET, Some(type_name), params).await
    }

    /// Add an entity; resolves to the id the server assigned.
    async fn add(&self, type_name: &str, entity: Value) -> Result<Option<Value>> {
        self.call(ADD, Some(type_name), entity_params(entity)).await
    }

    async fn set(&self, type_name: &str, entity: Value) -> Result<Option<Value>> {
        self.call(SET, Some(type_name), entity_params(entity)).await
    }

    async fn remove(&self, type_name: &str, entity: Value) -> Result<Option<Value>> {
        self.call(REMOVE, Some(type_name), entity_params(entity)).await
    }
}

fn entity_params(entity: Value) -> Params {
    let mut params = Params::new();
    params.insert("entity".to_string(), entity);
    params
}
