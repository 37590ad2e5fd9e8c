//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

use devicehub_dashboard::bus::{create_bus, ViewEvent};
use devicehub_dashboard::connector::{DataSource, FetchPath};
use devicehub_dashboard::dom::Document;
use devicehub_dashboard::error::DataSourceError;
use devicehub_dashboard::lifecycle::PageContext;
use devicehub_dashboard::locale::Locale;

/// In-memory data source answering from per-path queues.
///
/// Each fetch pops the next scripted reply for its path; the last reply
/// repeats once the queue is down to one. Unscripted paths answer 404.
pub struct ScriptedSource {
    delay: Duration,
    replies: Mutex<HashMap<String, VecDeque<Result<Value, u16>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, path: &str, reply: Value) {
        self.enqueue(path, Ok(reply));
    }

    pub fn push_failure(&self, path: &str, status: u16) {
        self.enqueue(path, Err(status));
    }

    fn enqueue(&self, path: &str, reply: Result<Value, u16>) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    fn next_reply(&self, path: &FetchPath) -> Result<Value, DataSourceError> {
        let mut replies = self.replies.lock().unwrap();
        let reply = match replies.get_mut(path.as_str()) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err(status)) => Err(DataSourceError::Status {
                path: path.to_string(),
                status,
            }),
            None => Err(DataSourceError::Status {
                path: path.to_string(),
                status: 404,
            }),
        }
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch(&self, path: &FetchPath) -> Result<Value, DataSourceError> {
        self.calls.lock().unwrap().push(path.to_string());
        tokio::time::sleep(self.delay).await;
        self.next_reply(path)
    }

    async fn submit(
        &self,
        path: &FetchPath,
        _form: &[(&str, &str)],
    ) -> Result<Value, DataSourceError> {
        self.fetch(path).await
    }
}

pub fn page_with(source: Arc<ScriptedSource>) -> PageContext {
    PageContext {
        document: Document::new(),
        source,
        locale: Arc::new(Locale::english()),
        bus: create_bus(),
    }
}

/// Wait for a specific event with timeout
pub async fn expect_event<F>(
    rx: &mut broadcast::Receiver<ViewEvent>,
    predicate: F,
    timeout_ms: u64,
) -> Option<ViewEvent>
where
    F: Fn(&ViewEvent) -> bool,
{
    timeout(Duration::from_millis(timeout_ms), async {
        loop {
            match rx.recv().await {
                Ok(event) if predicate(&event) => return Some(event),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}
