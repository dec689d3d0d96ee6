//! In-crate test domain: string keys, integer values

use crate::error::WatchError;
use crate::source::{Domain, WatchRequest};
use futures::channel::mpsc;
use futures::future;
use futures::stream;
use futures::{FutureExt, StreamExt};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::task::Poll;

#[derive(Default)]
pub(crate) struct TestDomain {
    overrides: BTreeMap<String, u64>,
    panics: BTreeSet<String>,
    poll: bool,
    streams: Mutex<HashMap<String, mpsc::UnboundedSender<Result<u64, WatchError>>>>,
    polls: Mutex<HashMap<String, VecDeque<Result<u64, WatchError>>>>,
    started: Mutex<Vec<String>>,
}

impl TestDomain {
    pub(crate) fn polling() -> Self {
        Self {
            poll: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_override(mut self, key: &str, value: u64) -> Self {
        self.overrides.insert(key.to_string(), value);
        self
    }

    /// Watches of `key` panic instead of delivering
    pub(crate) fn with_panic(mut self, key: &str) -> Self {
        self.panics.insert(key.to_string());
        self
    }

    pub(crate) fn script(&self, key: &str, result: Result<u64, WatchError>) {
        self.polls
            .lock()
            .entry(key.to_string())
            .or_default()
            .push_back(result);
    }

    /// Deliver a value on the latest push stream of `key`
    pub(crate) fn push(&self, key: &str, value: u64) -> bool {
        self.streams
            .lock()
            .get(key)
            .map(|tx| tx.unbounded_send(Ok(value)).is_ok())
            .unwrap_or(false)
    }

    pub(crate) fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }
}

impl Domain for TestDomain {
    type Key = String;
    type Value = u64;

    fn name(&self) -> &'static str {
        "test"
    }

    fn namespace(&self) -> &str {
        "values"
    }

    fn watch(&self, key: &String) -> WatchRequest<u64> {
        self.started.lock().push(key.clone());

        if self.panics.contains(key) {
            return if self.poll {
                WatchRequest::Poll(
                    future::lazy(|_| -> Result<u64, WatchError> { panic!("fetch exploded") }).boxed(),
                )
            } else {
                WatchRequest::Push(
                    stream::poll_fn(|_| -> Poll<Option<Result<u64, WatchError>>> {
                        panic!("stream exploded")
                    })
                    .boxed(),
                )
            };
        }

        if self.poll {
            let result = self
                .polls
                .lock()
                .get_mut(key)
                .and_then(|queue| queue.pop_front())
                .unwrap_or(Ok(0));
            WatchRequest::Poll(Box::pin(future::ready(result)))
        } else {
            let (tx, rx) = mpsc::unbounded();
            self.streams.lock().insert(key.clone(), tx);
            WatchRequest::Push(rx.boxed())
        }
    }

    fn has_content(&self, value: &u64) -> bool {
        *value != 0
    }

    fn apply_overlay(&self, key: &String, value: Option<u64>) -> Option<u64> {
        self.overrides.get(key).copied().or(value)
    }

    fn overlay_keys(&self) -> Vec<String> {
        self.overrides.keys().cloned().collect()
    }
}
