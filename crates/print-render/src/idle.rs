//! Network-idle detection.
//!
//! A page is idle once no more than `max_inflight` requests have been open
//! for a full quiet window. Any network event restarts the window.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

use futures::{Stream, StreamExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent<K> {
    Started(K),
    Finished(K),
}

/// Set of requests that have started but not yet finished or failed.
#[derive(Debug)]
pub struct InflightTracker<K> {
    inflight: HashSet<K>,
}

impl<K: Hash + Eq> Default for InflightTracker<K> {
    fn default() -> Self {
        Self {
            inflight: HashSet::new(),
        }
    }
}

impl<K: Hash + Eq> InflightTracker<K> {
    pub fn apply(&mut self, event: NetEvent<K>) {
        match event {
            // Redirects reuse the id, so a set keeps the count honest.
            NetEvent::Started(id) => {
                self.inflight.insert(id);
            }
            NetEvent::Finished(id) => {
                self.inflight.remove(&id);
            }
        }
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }
}

/// Resolve once the event stream has been quiet long enough. Returns early
/// if the stream ends. Callers bound the total wait with a timeout.
pub async fn wait_for_idle<K, S>(events: S, window: Duration, max_inflight: usize)
where
    K: Hash + Eq,
    S: Stream<Item = NetEvent<K>> + Unpin,
{
    let mut events = events;
    let mut tracker = InflightTracker::default();

    loop {
        if tracker.inflight() <= max_inflight {
            tokio::select! {
                event = events.next() => match event {
                    Some(event) => tracker.apply(event),
                    None => return,
                },
                _ = tokio::time::sleep(window) => return,
            }
        } else {
            match events.next().await {
                Some(event) => tracker.apply(event),
                None => return,
            }
        }
    }
}
