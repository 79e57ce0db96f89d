use async_trait::async_trait;
use mockito::{Matcher, Server};
use mygeotab_rs::{Credentials, MyGeotabApi, MyGeotabClient, Params, Result};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Records every call and answers with `null`.
struct RecordingApi {
    credentials: Arc<Credentials>,
    calls: Mutex<Vec<(String, Params)>>,
}

impl RecordingApi {
    fn new() -> Self {
        Self {
            credentials: Arc::new(
                Credentials::with_session("user@example.com", "abc123", "fleet", "my.geotab.com")
                    .unwrap(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, params)| (method.clone(), Value::Object(params.clone())))
            .collect()
    }
}

#[async_trait]
impl MyGeotabApi for RecordingApi {
    async fn authenticate(&self) -> Result<Arc<Credentials>> {
        Ok(self.credentials.clone())
    }

    async fn call(
        &self,
        method: &str,
        type_name: Option<&str>,
        mut params: Params,
    ) -> Result<Option<Value>> {
        if let Some(type_name) = type_name {
            params.insert("typeName".to_string(), json!(type_name));
        }
        self.calls.lock().unwrap().push((method.to_string(), params));
        Ok(None)
    }
}

fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => panic!("params must be an object"),
    }
}

#[tokio::test]
async fn test_get() {
    let api = RecordingApi::new();
    api.get("Device", params(json!({"fromVersion": "0000"})))
        .await
        .unwrap();

    assert_eq!(
        api.calls(),
        vec![(
            "Get".to_string(),
            json!({"typeName": "Device", "fromVersion": "0000"})
        )]
    );
}

#[tokio::test]
async fn test_search_wraps_criteria() {
    let api = RecordingApi::new();
    api.search("Device", params(json!({"resultsLimit": 5, "name": "x"})))
        .await
        .unwrap();

    assert_eq!(
        api.calls(),
        vec![(
            "Get".to_string(),
            json!({"typeName": "Device", "resultsLimit": 5, "search": {"name": "x"}})
        )]
    );
}

#[tokio::test]
async fn test_search_without_limit_sends_null_limit() {
    let api = RecordingApi::new();
    api.search("Trip", params(json!({"deviceSearch": {"id": "b1"}})))
        .await
        .unwrap();

    assert_eq!(
        api.calls(),
        vec![(
            "Get".to_string(),
            json!({"typeName": "Trip", "resultsLimit": null, "search": {"deviceSearch": {"id": "b1"}}})
        )]
    );
}

#[tokio::test]
async fn test_search_without_criteria_is_get() {
    let searched = RecordingApi::new();
    searched.search("Device", Params::new()).await.unwrap();

    let fetched = RecordingApi::new();
    fetched.get("Device", Params::new()).await.unwrap();

    assert_eq!(searched.calls(), fetched.calls());
    assert_eq!(
        searched.calls(),
        vec![("Get".to_string(), json!({"typeName": "Device"}))]
    );
}

#[tokio::test]
async fn test_multi_call_preserves_order() {
    let api = RecordingApi::new();
    api.multi_call(vec![
        ("Get".to_string(), params(json!({"typeName": "Trip"}))),
        ("GetCountOf".to_string(), params(json!({"typeName": "Device"}))),
    ])
    .await
    .unwrap();

    assert_eq!(
        api.calls(),
        vec![(
            "ExecuteMultiCall".to_string(),
            json!({"calls": [
                {"method": "Get", "params": {"typeName": "Trip"}},
                {"method": "GetCountOf", "params": {"typeName": "Device"}}
            ]})
        )]
    );
}

#[tokio::test]
async fn test_entity_shortcuts() {
    let api = RecordingApi::new();
    let entity = json!({"id": "b1", "name": "Truck 1"});

    api.add("Device", entity.clone()).await.unwrap();
    api.set("Device", entity.clone()).await.unwrap();
    api.remove("Device", entity.clone()).await.unwrap();

    let expected = json!({"typeName": "Device", "entity": entity});
    assert_eq!(
        api.calls(),
        vec![
            ("Add".to_string(), expected.clone()),
            ("Set".to_string(), expected.clone()),
            ("Remove".to_string(), expected),
        ]
    );
}

#[tokio::test]
async fn test_client_search_on_the_wire() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/apiv1")
        .match_body(Matcher::Json(json!({
            "id": -1,
            "method": "Get",
            "params": {
                "typeName": "Device",
                "resultsLimit": 5,
                "search": {"name": "x"},
                "credentials": {"userName": "user@example.com", "database": "fleet", "sessionId": "abc123"}
            }
        })))
        .with_status(200)
        .with_body(r#"{"result": [{"id": "b1", "name": "x"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let client = MyGeotabClient::new(
        Credentials::with_session("user@example.com", "abc123", "fleet", server.url()).unwrap(),
    );

    let result = client
        .search("Device", params(json!({"resultsLimit": 5, "name": "x"})))
        .await
        .unwrap();

    assert_eq!(result, Some(json!([{"id": "b1", "name": "x"}])));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_add_returns_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/apiv1")
        .match_body(Matcher::PartialJson(json!({
            "method": "Add",
            "params": {"typeName": "Zone", "entity": {"name": "Depot"}}
        })))
        .with_status(200)
        .with_body(r#"{"result": "b2A"}"#)
        .expect(1)
        .create_async()
        .await;
    let client = MyGeotabClient::new(
        Credentials::with_session("user@example.com", "abc123", "fleet", server.url()).unwrap(),
    );

    let id = client.add("Zone", json!({"name": "Depot"})).await.unwrap();

    assert_eq!(id, Some(json!("b2A")));
    mock.assert_async().await;
}
