// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{Arc, Mutex, PoisonError, Weak};

use smallvec::SmallVec;

type Callback<M> = Box<dyn FnMut(&M) + Send>;

struct Subscribers<M> {
    next_id: u64,
    // A channel rarely has more than a couple of listeners.
    entries: SmallVec<[(u64, Callback<M>); 2]>,
}

/// Typed publish/subscribe channel.
///
/// `Messenger` delivers each published message to every live subscriber, in
/// subscription order, on the publisher's thread. Delivery is at-most-once
/// and unacknowledged; there is no queueing.
///
/// Subscriptions are scoped: [`Messenger::subscribe`] returns a
/// [`Subscription`] handle and dropping it unsubscribes. A component that
/// listens for the lifetime of a screen holds the handle for exactly that
/// lifetime.
///
/// ```
/// use lapmap_session::Messenger;
/// use std::sync::{Arc, Mutex};
///
/// let messenger = Messenger::<u32>::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// let subscription = messenger.subscribe(move |m| sink.lock().unwrap().push(*m));
///
/// messenger.publish(&7);
/// drop(subscription);
/// messenger.publish(&8);
///
/// assert_eq!(*seen.lock().unwrap(), vec![7]);
/// ```
pub struct Messenger<M> {
    subscribers: Arc<Mutex<Subscribers<M>>>,
}

impl<M> core::fmt::Debug for Messenger<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Messenger { .. }")
    }
}

impl<M> Default for Messenger<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Messenger<M> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<M> Messenger<M> {
    /// Creates a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Subscribers {
                next_id: 0,
                entries: SmallVec::new(),
            })),
        }
    }

    /// Registers a subscriber and returns its scoped handle.
    ///
    /// The callback runs on whichever thread publishes and must not call
    /// back into this messenger.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl FnMut(&M) + Send + 'static) -> Subscription<M> {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = subs.next_id;
        subs.next_id += 1;
        subs.entries.push((id, Box::new(callback)));
        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Delivers a message to every live subscriber.
    pub fn publish(&self, message: &M) {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in &mut subs.entries {
            callback(message);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

/// RAII handle for one subscription; dropping it unsubscribes.
pub struct Subscription<M> {
    id: u64,
    subscribers: Weak<Mutex<Subscribers<M>>>,
}

impl<M> core::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl<M> Drop for Subscription<M> {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            let mut subs = subscribers.lock().unwrap_or_else(PoisonError::into_inner);
            subs.entries.retain(|(id, _)| *id != self.id);
        }
    }
}
