use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use msgapi_messages::{
    AppError, AppErrorOptions, AppResult, Command, CommandResponse, Event, FindQuery,
    FindQueryResponse, GetQuery, GetQueryResponse, MessageApi, MessageApiError, MessageBody,
    MessageKind, ResponseBody, keys,
};

/// In-test `MessageApi`: canned JSON data, records every call.
#[derive(Default)]
struct StubApi {
    calls: Mutex<Vec<(MessageKind, String)>>,
    published: Mutex<Vec<JsonValue>>,
    records: HashMap<String, JsonValue>,
    rows: Vec<JsonValue>,
    command_response: Option<CommandResponse>,
}

impl StubApi {
    fn record(&self, kind: MessageKind, name: &str) {
        self.calls.lock().unwrap().push((kind, name.to_string()));
    }

    fn calls(&self) -> Vec<(MessageKind, String)> {
        self.calls.lock().unwrap().clone()
    }
}

fn decode<T: ResponseBody>(value: JsonValue) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| MessageApiError::transport("response decode failed", e).into())
}

fn encode<T: MessageBody>(value: &T) -> AppResult<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| MessageApiError::transport("request encode failed", e).into())
}

#[async_trait]
impl MessageApi for StubApi {
    async fn get<C, R>(&self, query: GetQuery<C, R>) -> AppResult<GetQueryResponse<R>>
    where
        C: MessageBody,
        R: ResponseBody,
    {
        self.record(MessageKind::Get, query.message_name().as_str());
        let key = encode(query.criteria())?.to_string();
        let found = match self.records.get(&key) {
            Some(value) => Some(decode::<R>(value.clone())?),
            None => None,
        };
        query.resolve(found)
    }

    async fn find<C, R>(&self, query: FindQuery<C, R>) -> AppResult<FindQueryResponse<R>>
    where
        C: MessageBody,
        R: ResponseBody,
    {
        self.record(MessageKind::Find, query.message_name().as_str());
        let start = query.offset().min(self.rows.len());
        let end = (start + query.limit()).min(self.rows.len());
        let results = self.rows[start..end]
            .iter()
            .cloned()
            .map(decode::<R>)
            .collect::<AppResult<Vec<R>>>()?;
        Ok(FindQueryResponse::page(results, start, end < self.rows.len()))
    }

    async fn command<P>(&self, command: Command<P>) -> AppResult<CommandResponse>
    where
        P: MessageBody,
    {
        self.record(MessageKind::Command, command.message_name().as_str());
        if command.message_name().as_str() == "Unknown" {
            return Err(MessageApiError::no_handler(command.message_name().as_str()).into());
        }
        if command.message_name().as_str() == "RejectUser" {
            return Err(AppError::new(
                AppErrorOptions::new()
                    .key("VALIDATION")
                    .message("name taken")
                    .capture_stack(false),
            ));
        }
        Ok(self
            .command_response
            .clone()
            .unwrap_or_else(|| CommandResponse::for_command(&command, Some("generated".into()))))
    }

    async fn publish<P>(&self, event: Event<P>) -> AppResult<()>
    where
        P: MessageBody,
    {
        self.record(MessageKind::Event, event.message_name().as_str());
        let payload = encode(event.payload())?;
        self.published.lock().unwrap().push(payload);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

#[derive(Debug, Clone, Serialize)]
struct CreateUser {
    name: String,
}

fn users(n: u32) -> Vec<JsonValue> {
    (0..n).map(|i| json!({"id": i, "name": format!("user-{i}")})).collect()
}

#[tokio::test]
async fn command_invoke_returns_the_api_response() {
    msgapi_observability::init();
    let expected = CommandResponse::new(Some("cmd-1".into()));
    let api = StubApi {
        command_response: Some(expected.clone()),
        ..StubApi::default()
    };

    let cmd = Command::new("CreateUser", CreateUser { name: "Al".into() }).unwrap();
    let resp = cmd.invoke(&api).await.unwrap();

    assert_eq!(resp, expected);
    assert_eq!(api.calls(), vec![(MessageKind::Command, "CreateUser".to_string())]);
}

#[tokio::test]
async fn command_response_echoes_correlation() {
    let api = StubApi::default();
    let cmd = Command::new("CreateUser", CreateUser { name: "Al".into() })
        .unwrap()
        .with_new_message_id()
        .with_correlation_id("corr-1");
    let message_id = cmd.meta().message_id().map(str::to_owned);

    let resp = api.invoke(cmd).await.unwrap();
    assert_eq!(resp.correlation_id(), Some("corr-1"));
    assert_eq!(resp.message_id().map(str::to_owned), message_id);
    assert_eq!(resp.response_id(), Some("generated"));
}

#[tokio::test]
async fn errors_surface_unchanged() {
    let api = StubApi::default();

    let err = Command::new("Unknown", json!({}))
        .unwrap()
        .invoke(&api)
        .await
        .unwrap_err();
    assert!(err.is_app_error());
    assert!(err.is_message_api_error());
    assert!(err.has_key(keys::NO_HANDLER));

    let err = api
        .invoke(Command::new("RejectUser", json!({"name": "Al"})).unwrap())
        .await
        .unwrap_err();
    assert!(!err.is_message_api_error());
    assert_eq!(err.to_string(), "VALIDATION: name taken");
}

#[tokio::test]
async fn get_round_trips_result() {
    let mut records = HashMap::new();
    records.insert("42".to_string(), json!({"id": 42, "name": "Al"}));
    let api = StubApi {
        records,
        ..StubApi::default()
    };

    let resp = GetQuery::<u32, User>::new("GetUser", 42)
        .unwrap()
        .invoke(&api)
        .await
        .unwrap();
    assert_eq!(
        resp.result(),
        Some(&User {
            id: 42,
            name: "Al".into()
        })
    );
}

#[tokio::test]
async fn get_miss_respects_fail_if_not_found() {
    let api = StubApi::default();

    let resp = api
        .invoke(GetQuery::<u32, User>::new("GetUser", 1).unwrap())
        .await
        .unwrap();
    assert!(!resp.is_found());

    let err = api
        .invoke(GetQuery::<u32, User>::new("GetUser", 1).unwrap().fail_if_not_found(true))
        .await
        .unwrap_err();
    assert!(err.has_key(keys::NOT_FOUND));
}

#[tokio::test]
async fn find_pages_until_has_more_is_false() {
    let api = StubApi {
        rows: users(25),
        ..StubApi::default()
    };

    let mut query = FindQuery::<JsonValue, User>::new("FindUsers", json!({}))
        .unwrap()
        .with_limit(10);
    let mut seen = Vec::new();

    loop {
        let resp = query.clone().invoke(&api).await.unwrap();
        assert_eq!(resp.offset(), query.offset());
        assert!(resp.len() <= query.limit());
        seen.extend(resp.results().iter().map(|u| u.id));
        match query.next_page(&resp) {
            Some(next) => query = next,
            None => break,
        }
    }

    assert_eq!(seen, (0..25).collect::<Vec<_>>());
    assert_eq!(api.calls().len(), 3);
}

#[tokio::test]
async fn find_without_limit_uses_default_page_size() {
    let api = StubApi {
        rows: users(150),
        ..StubApi::default()
    };

    let resp = api
        .invoke(FindQuery::<JsonValue, User>::new("FindUsers", json!({})).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.len(), 100);
    assert!(resp.has_more());
    assert_eq!(resp.next_offset(), Some(100));
}

#[tokio::test]
async fn first_page_of_ten_continues_at_offset_ten() {
    let api = StubApi {
        rows: users(30),
        ..StubApi::default()
    };

    let query = FindQuery::<JsonValue, User>::new("FindUsers", json!({}))
        .unwrap()
        .with_limit(10);
    let first = query.clone().invoke(&api).await.unwrap();
    assert_eq!(first.len(), 10);
    assert!(first.has_more());

    let next = query.next_page(&first).expect("continuation");
    assert_eq!(next.offset(), 10);
    let second = next.invoke(&api).await.unwrap();
    assert_eq!(second.results()[0].id, 10);
}

#[tokio::test]
async fn events_route_to_publish() {
    let api = StubApi::default();

    let mut event = Event::new("UserCreated", json!({"id": 1})).unwrap();
    event.payload_mut()["name"] = json!("Al");
    api.invoke(event).await.unwrap();

    Event::new("UserDeleted", json!({"id": 2}))
        .unwrap()
        .invoke(&api)
        .await
        .unwrap();

    assert_eq!(
        *api.published.lock().unwrap(),
        vec![json!({"id": 1, "name": "Al"}), json!({"id": 2})]
    );
    assert_eq!(
        api.calls(),
        vec![
            (MessageKind::Event, "UserCreated".to_string()),
            (MessageKind::Event, "UserDeleted".to_string()),
        ]
    );
}

#[tokio::test]
async fn shared_api_behind_arc() {
    let api = Arc::new(StubApi::default());

    let resp = Command::new("CreateUser", CreateUser { name: "Bo".into() })
        .unwrap()
        .with_request_id("req-7")
        .invoke(&api)
        .await
        .unwrap();
    assert_eq!(resp.request_id(), Some("req-7"));
    assert_eq!(api.calls().len(), 1);
}
