//! Scriptable in-memory transport and upstream payload builders for tests.

use crate::transport::{HttpTransport, TransportError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

/// A request observed by [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct FakeRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub timeout: Duration,
}

impl FakeRequest {
    /// Value of the first query parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What the fake answers, optionally after a delay.
pub struct FakeReply {
    pub delay: Duration,
    pub result: Result<Value, TransportError>,
}

impl FakeReply {
    pub fn ok(value: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub fn err(error: TransportError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = Box<dyn Fn(&FakeRequest) -> FakeReply + Send + Sync>;

/// Transport that answers from a closure and records every call.
pub struct FakeTransport {
    handler: Handler,
    calls: Mutex<Vec<FakeRequest>>,
}

impl FakeTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&FakeRequest) -> FakeReply + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every recorded request, in call order.
    pub fn calls(&self) -> Vec<FakeRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls whose URL contains `fragment`.
    pub fn calls_to(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let request = FakeRequest {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            timeout,
        };
        self.calls.lock().unwrap().push(request.clone());
        let reply = (self.handler)(&request);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

/// Store search payload with the given `(id, name)` items, in rank order.
pub fn store_search_body(items: &[(u64, &str)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(id, name)| json!({ "type": "app", "id": id, "name": name }))
        .collect();
    json!({ "total": items.len(), "items": items })
}

/// App list payload.
pub fn app_list_body(apps: &[(u64, &str)]) -> Value {
    let apps: Vec<Value> = apps
        .iter()
        .map(|(id, name)| json!({ "appid": id, "name": name }))
        .collect();
    json!({ "applist": { "apps": apps } })
}

/// News payload; each item is `(title, contents, unix_date, url)`.
pub fn news_body(app_id: u64, items: &[(&str, &str, i64, &str)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(title, contents, date, url)| {
            json!({
                "gid": format!("{app_id}-{date}"),
                "title": title,
                "url": url,
                "author": "Valve",
                "contents": contents,
                "date": date,
                "feedlabel": "Community Announcements",
            })
        })
        .collect();
    json!({ "appnews": { "appid": app_id, "newsitems": items, "count": items.len() } })
}

/// Translation payload for a single translated segment.
pub fn translation_body(translated: &str, original: &str, detected: &str) -> Value {
    json!([[[translated, original, null, null, 10]], null, detected])
}
