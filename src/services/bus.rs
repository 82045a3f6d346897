// src/services/bus.rs
//
// In-process publish/subscribe for "something the summary depends on has
// changed". Events carry no payload beyond topic and owner; subscribers
// re-read whatever they need.

use dashmap::DashMap;
use serde::Serialize;
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    BudgetItemsChanged,
    LoansOrEmisChanged,
    SalaryChanged,
}

impl Topic {
    pub const ALL: [Topic; 3] = [
        Topic::BudgetItemsChanged,
        Topic::LoansOrEmisChanged,
        Topic::SalaryChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::BudgetItemsChanged => "budget-items-changed",
            Topic::LoansOrEmisChanged => "loans-or-emis-changed",
            Topic::SalaryChanged => "salary-changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub topic: Topic,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

type Handler = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_token: AtomicU64,
    subscriptions: DashMap<SubscriptionToken, (Topic, Handler)>,
}

#[derive(Clone, Default)]
pub struct ChangeBus {
    registry: Arc<Registry>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionToken
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        let token = SubscriptionToken(self.registry.next_token.fetch_add(1, Ordering::Relaxed));
        self.registry
            .subscriptions
            .insert(token, (topic, Arc::new(handler)));
        debug!("Subscribed {:?} to {}", token, topic.as_str());
        token
    }

    /// Returns whether the token was still registered. Safe to call twice.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.registry.subscriptions.remove(&token).is_some()
    }

    /// Delivers `topic` for `user_id` to every current subscriber of that topic
    /// and returns how many were notified. Handlers run on the caller's thread
    /// after the registry lock is released, so a handler may (un)subscribe.
    pub fn publish(&self, user_id: Uuid, topic: Topic) -> usize {
        let handlers: Vec<Handler> = self
            .registry
            .subscriptions
            .iter()
            .filter(|entry| entry.value().0 == topic)
            .map(|entry| entry.value().1.clone())
            .collect();

        let event = ChangeEvent { topic, user_id };
        for handler in &handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                error!("Subscriber to {} panicked; continuing", topic.as_str());
            }
        }

        debug!(
            "Published {} for user {} to {} subscriber(s)",
            topic.as_str(),
            user_id,
            handlers.len()
        );
        handlers.len()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .subscriptions
            .iter()
            .filter(|entry| entry.value().0 == topic)
            .count()
    }
}
