//! # Chain State - Demand-Driven Cache Engine
//!
//! ## Purpose
//!
//! Exposes continuously changing chain state to many independent consumers as
//! cached, incrementally updated values, while keeping exactly one live chain
//! watch per demanded key and surviving restarts through a persisted snapshot.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Push streams and poll fetches produced by a [`Domain`]
//! - **Output Destinations**: [`Subscription`] views and engine snapshots
//! - **State Persistence**: One JSON snapshot per namespace behind [`SnapshotStorage`]
//!
//! ## Architecture Role
//!
//! ```text
//! subscribe(keys) → [Registry] → [Demand Multiplexer] → [Watcher Manager] → Domain::watch
//!                                        ↓                      ↓
//!                                   DemandSet            statuses + Store::set
//!                                        └──────→ [Combiner] ←──┘
//!                                                     ↓
//!                                     watch::Sender<Arc<CombinedState>>
//!                                                     ↓
//!                                        Subscription::next() views
//! ```
//!
//! Every engine runs one loop task that owns the multiplexer and the watcher
//! table. Watchers and timers are separate tasks reporting back over a
//! channel with generation-tagged messages, so a cancelled watcher can never
//! write into the store.

pub mod combiner;
pub mod demand;
pub mod engine;
pub mod error;
pub mod key;
pub mod registry;
pub mod source;
pub mod stats;
pub mod status;
pub mod storage;
pub mod store;
pub mod subscription;

mod watcher;

#[cfg(test)]
mod testing;

pub use combiner::{combine, CombinedState};
pub use demand::{DemandMultiplexer, DemandSet};
pub use engine::CacheEngine;
pub use error::{DecodeError, KeyError, PersistenceError, StateError, WatchError};
pub use key::CacheKey;
pub use registry::{SubscriptionRegistry, SubscriptionToken};
pub use source::{BlockTag, ChainWatch, Domain, WatchRequest};
pub use stats::{EngineStats, EngineStatsSnapshot};
pub use status::{CachedEntry, LoadingStatus};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
pub use store::Store;
pub use subscription::{Subscription, SubscriptionState};
