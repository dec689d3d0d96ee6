//! Scriptable in-memory domain for engine tests

#![allow(dead_code)]

use chain_state::{Domain, Subscription, SubscriptionState, WatchError, WatchRequest};
use config::CacheSettings;
use futures::channel::mpsc;
use futures::{future, FutureExt, StreamExt};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

pub const APP: &str = "test";
pub const NAMESPACE: &str = "test::fake";

/// Outcome of one poll fetch
pub enum Script {
    Ready(Result<u64, WatchError>),
    Hang,
}

#[derive(Default)]
struct FakeInner {
    poll: bool,
    streams: Mutex<HashMap<String, mpsc::UnboundedSender<Result<u64, WatchError>>>>,
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    started: Mutex<Vec<String>>,
}

/// Domain whose watches are driven by the test; clones share state
#[derive(Clone, Default)]
pub struct FakeDomain {
    inner: Arc<FakeInner>,
}

impl FakeDomain {
    pub fn push() -> Self {
        Self::default()
    }

    pub fn poll() -> Self {
        Self {
            inner: Arc::new(FakeInner {
                poll: true,
                ..FakeInner::default()
            }),
        }
    }

    /// Deliver a value on the live stream of `key`
    pub fn send(&self, key: &str, value: u64) -> bool {
        self.inner
            .streams
            .lock()
            .get(key)
            .map(|tx| tx.unbounded_send(Ok(value)).is_ok())
            .unwrap_or(false)
    }

    pub fn fail(&self, key: &str, err: WatchError) -> bool {
        self.inner
            .streams
            .lock()
            .get(key)
            .map(|tx| tx.unbounded_send(Err(err)).is_ok())
            .unwrap_or(false)
    }

    /// End the live stream of `key`
    pub fn close(&self, key: &str) {
        self.inner.streams.lock().remove(key);
    }

    pub fn script(&self, key: &str, script: Script) {
        self.inner
            .scripts
            .lock()
            .entry(key.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn starts(&self, key: &str) -> usize {
        self.inner.started.lock().iter().filter(|k| *k == key).count()
    }

    pub fn started(&self) -> Vec<String> {
        self.inner.started.lock().clone()
    }
}

impl Domain for FakeDomain {
    type Key = String;
    type Value = u64;

    fn name(&self) -> &'static str {
        "fake"
    }

    fn namespace(&self) -> &str {
        "fake"
    }

    fn watch(&self, key: &String) -> WatchRequest<u64> {
        self.inner.started.lock().push(key.clone());

        if self.inner.poll {
            let script = self
                .inner
                .scripts
                .lock()
                .get_mut(key)
                .and_then(|queue| queue.pop_front())
                .unwrap_or(Script::Ready(Ok(0)));
            match script {
                Script::Ready(result) => WatchRequest::Poll(future::ready(result).boxed()),
                Script::Hang => WatchRequest::Poll(future::pending().boxed()),
            }
        } else {
            let (tx, rx) = mpsc::unbounded();
            self.inner.streams.lock().insert(key.clone(), tx);
            WatchRequest::Push(rx.boxed())
        }
    }

    fn has_content(&self, value: &u64) -> bool {
        *value != 0
    }
}

pub fn settings() -> CacheSettings {
    CacheSettings::default()
}

pub fn key(name: &str) -> String {
    name.to_string()
}

/// Let every debounce window close and the engine go idle
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(250)).await;
}

pub async fn next_state(
    subscription: &mut Subscription<String, u64>,
) -> SubscriptionState<String, u64> {
    tokio::time::timeout(Duration::from_secs(3_600), subscription.next())
        .await
        .expect("no state change within an hour")
        .expect("engine stopped")
}
