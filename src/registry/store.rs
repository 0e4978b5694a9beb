//! Channel registry implementation
//!
//! The central registry that maps channels to their subscribers and routes
//! forwarded lines from bridges to every consumer joined to the target
//! channel.
//!
//! All state lives behind one `tokio::sync::Mutex`: the channel map, its
//! reverse map, and the subscriber handles form a single consistency domain,
//! so every operation here is one critical section. Broadcast writes happen
//! while the lock is held, which keeps delivery atomic with respect to
//! membership changes; the trade-off is that a slow subscriber socket stalls
//! other registry users for the duration of the write.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::sync::Mutex;

use super::subscriber::Subscriber;
use crate::protocol::LINE_TERMINATOR;

#[derive(Default)]
struct RegistryInner {
    /// Channel name to the ids of its subscribers
    channels: HashMap<String, HashSet<u64>>,

    /// Reverse map: subscriber id to the channels it has joined
    memberships: HashMap<u64, HashSet<String>>,

    /// Write handles, keyed by subscriber id
    subscribers: HashMap<u64, Arc<Subscriber>>,
}

/// Central registry of channel subscriptions
///
/// The two directions of the channel/connection mapping are only ever
/// mutated together, under the same lock, so they stay mutual inverses and
/// a channel entry disappears the moment its last subscriber leaves.
#[derive(Default)]
pub struct ChannelRegistry {
    inner: Mutex<RegistryInner>,
}

impl ChannelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber to a channel. Idempotent; never fails.
    pub async fn subscribe(&self, subscriber: &Arc<Subscriber>, channel: &str) {
        let mut inner = self.inner.lock().await;
        let id = subscriber.id();

        inner
            .channels
            .entry(channel.to_owned())
            .or_default()
            .insert(id);
        inner
            .memberships
            .entry(id)
            .or_default()
            .insert(channel.to_owned());
        inner.subscribers.insert(id, Arc::clone(subscriber));

        tracing::debug!(
            peer = %subscriber.peer_addr(),
            channel = %channel,
            "Subscribed"
        );
    }

    /// Remove a subscriber from every channel it joined and forget its
    /// write handle. Channels left empty are deleted. No-op for ids the
    /// registry has never seen.
    pub async fn unsubscribe_all(&self, id: u64) {
        let mut inner = self.inner.lock().await;

        let Some(channels) = inner.memberships.remove(&id) else {
            return;
        };

        for channel in &channels {
            if let Some(ids) = inner.channels.get_mut(channel) {
                ids.remove(&id);
                if ids.is_empty() {
                    inner.channels.remove(channel);
                }
            }
        }

        if let Some(subscriber) = inner.subscribers.remove(&id) {
            tracing::debug!(
                peer = %subscriber.peer_addr(),
                channels = channels.len(),
                "Unsubscribed from all channels"
            );
        }
    }

    /// Deliver one line to every subscriber of a channel.
    ///
    /// The raw line is framed once and written byte-identical to each
    /// subscriber. A failed write is logged and skipped; it never aborts
    /// delivery to the rest and never surfaces to the caller. The broken
    /// connection's own handler cleans it up when it notices the transport
    /// error. A channel with no subscribers is a silent no-op.
    pub async fn broadcast(&self, channel: &str, line: &str) {
        let inner = self.inner.lock().await;

        let Some(ids) = inner.channels.get(channel) else {
            return;
        };

        let mut frame = BytesMut::with_capacity(line.len() + LINE_TERMINATOR.len());
        frame.put_slice(line.as_bytes());
        frame.put_slice(LINE_TERMINATOR.as_bytes());
        let frame: Bytes = frame.freeze();

        for id in ids {
            let Some(subscriber) = inner.subscribers.get(id) else {
                continue;
            };

            match subscriber.write_frame(&frame).await {
                Ok(()) => tracing::info!(
                    peer = %subscriber.peer_addr(),
                    channel = %channel,
                    line = %line,
                    "PUSH"
                ),
                Err(e) => tracing::warn!(
                    peer = %subscriber.peer_addr(),
                    channel = %channel,
                    error = %e,
                    "Delivery failed"
                ),
            }
        }
    }

    /// Number of channels with at least one subscriber
    pub async fn channel_count(&self) -> usize {
        self.inner.lock().await.channels.len()
    }

    /// Number of subscribers currently joined to a channel
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.inner
            .lock()
            .await
            .channels
            .get(channel)
            .map_or(0, HashSet::len)
    }

    /// Whether the given subscriber id is joined to the given channel
    pub async fn is_subscribed(&self, id: u64, channel: &str) -> bool {
        self.inner
            .lock()
            .await
            .channels
            .get(channel)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Channels the given subscriber id has joined, in no particular order
    pub async fn channels_of(&self, id: u64) -> Vec<String> {
        self.inner
            .lock()
            .await
            .memberships
            .get(&id)
            .map(|channels| channels.iter().cloned().collect())
            .unwrap_or_default()
    }
}
