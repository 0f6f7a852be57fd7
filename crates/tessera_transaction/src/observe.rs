//! Subscriptions and observable values.
//!
//! Notification is synchronous: callbacks run inside the call that caused
//! the change, in subscription order.

use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback receiving a value by reference.
pub type Callback<T> = Box<dyn FnMut(&T)>;

/// Subscribers keyed by id.
pub struct Subscriptions<E> {
    entries: BTreeMap<SubscriptionId, E>,
    next_id: SubscriptionId,
}

impl<E> Default for Subscriptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Subscriptions<E> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Adds a subscriber and returns its id.
    pub fn subscribe(&mut self, entry: E) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, entry);
        id
    }

    /// Removes a subscriber. Returns true if it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Returns a subscriber by id.
    pub fn get_mut(&mut self, id: SubscriptionId) -> Option<&mut E> {
        self.entries.get_mut(&id)
    }

    /// Iterates subscribers in subscription order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SubscriptionId, &mut E)> {
        self.entries.iter_mut().map(|(id, e)| (*id, e))
    }

    /// Returns the number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every subscriber.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Subscriptions<Callback<T>> {
    /// Calls every subscriber with `value`.
    pub fn notify_all(&mut self, value: &T) {
        for callback in self.entries.values_mut() {
            callback(value);
        }
    }
}

impl<E> fmt::Debug for Subscriptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("ids", &self.entries.keys().collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// A value that notifies subscribers when it changes.
pub struct Observable<T> {
    value: T,
    subscribers: Subscriptions<Callback<T>>,
}

impl<T: PartialEq> Observable<T> {
    /// Creates an observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Subscriptions::new(),
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value, notifying subscribers if it differs.
    ///
    /// Returns true if the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.subscribers.notify_all(&self.value);
        true
    }

    /// Subscribes to changes. The callback is also called once with the
    /// current value.
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        callback(&self.value);
        self.subscribers.subscribe(Box::new(callback))
    }

    /// Removes a subscriber. Returns true if it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Returns the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
