/// Push-subscription registry.
/// The subscription map sits behind a trait and is injected as app data,
/// so handlers never touch a global. Delivery is handled elsewhere; this
/// only keeps track of who registered which endpoint.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushSubscription {
    pub endpoint: String,
    pub auth_key: String,
    pub p256dh_key: String,
}

pub trait PushStore: Send + Sync {
    fn subscribe(&self, username: &str, subscription: PushSubscription);
    /// Returns true when a matching subscription existed
    fn unsubscribe(&self, username: &str, endpoint: &str) -> bool;
    fn subscriptions_for(&self, username: &str) -> Vec<PushSubscription>;
}

/// Process-local registry; subscriptions do not survive a restart, which
/// matches browser push anyway (clients re-subscribe on load).
#[derive(Default)]
pub struct InMemoryPushStore {
    subscriptions: RwLock<HashMap<String, Vec<PushSubscription>>>,
}

impl InMemoryPushStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PushStore for InMemoryPushStore {
    fn subscribe(&self, username: &str, subscription: PushSubscription) {
        let mut map = self.subscriptions.write().expect("push store poisoned");
        let entries = map.entry(username.to_string()).or_default();
        entries.retain(|s| s.endpoint != subscription.endpoint);
        entries.push(subscription);
    }

    fn unsubscribe(&self, username: &str, endpoint: &str) -> bool {
        let mut map = self.subscriptions.write().expect("push store poisoned");
        match map.get_mut(username) {
            Some(entries) => {
                let before = entries.len();
                entries.retain(|s| s.endpoint != endpoint);
                before != entries.len()
            }
            None => false,
        }
    }

    fn subscriptions_for(&self, username: &str) -> Vec<PushSubscription> {
        let map = self.subscriptions.read().expect("push store poisoned");
        map.get(username).cloned().unwrap_or_default()
    }
}
