// src/services/live.rs
//
// Keeps a user's summary current: a mounted binding recomputes whenever the
// bus reports a change for its user and exposes the newest applied result.

use crate::services::{
    bus::{ChangeBus, SubscriptionToken, Topic},
    summary::{SummaryEngine, SummaryReport},
};
use dashmap::DashMap;
use std::{
    sync::{Arc, Mutex, PoisonError, Weak},
    time::{Duration, Instant},
};
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info};
use uuid::Uuid;

pub type LatestSummary = Option<Arc<SummaryReport>>;

pub struct SummaryBinding {
    user_id: Uuid,
    engine: SummaryEngine,
    bus: ChangeBus,
    runtime: Handle,
    tokens: Mutex<Vec<SubscriptionToken>>,
    latest: watch::Sender<LatestSummary>,
}

impl SummaryBinding {
    /// Subscribes to every summary-affecting topic and performs the initial
    /// computation before returning. Must be called inside a Tokio runtime.
    pub async fn mount(user_id: Uuid, engine: SummaryEngine, bus: ChangeBus) -> Arc<Self> {
        let (latest, _) = watch::channel(None);
        let binding = Arc::new(Self {
            user_id,
            engine,
            bus,
            runtime: Handle::current(),
            tokens: Mutex::new(Vec::new()),
            latest,
        });

        let tokens: Vec<SubscriptionToken> = Topic::ALL
            .into_iter()
            .map(|topic| {
                let weak: Weak<Self> = Arc::downgrade(&binding);
                binding.bus.subscribe(topic, move |event| {
                    if event.user_id != user_id {
                        return;
                    }
                    if let Some(binding) = weak.upgrade() {
                        binding.schedule_refresh();
                    }
                })
            })
            .collect();
        *binding.tokens_guard() = tokens;

        binding.refresh().await;
        info!("Summary binding mounted for user {}", user_id);
        binding
    }

    fn tokens_guard(&self) -> std::sync::MutexGuard<'_, Vec<SubscriptionToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_refresh(self: Arc<Self>) {
        let runtime = self.runtime.clone();
        runtime.spawn(async move {
            self.refresh().await;
        });
    }

    /// Runs one computation and applies it unless a later-started one has
    /// already been applied. Returns whether the result was applied.
    pub async fn refresh(&self) -> bool {
        let report = self.engine.compute_summary(self.user_id).await;
        self.apply(report)
    }

    fn apply(&self, report: SummaryReport) -> bool {
        let sequence = report.sequence;
        let applied = self.latest.send_if_modified(|current| match current {
            Some(shown) if shown.sequence >= sequence => false,
            _ => {
                *current = Some(Arc::new(report));
                true
            }
        });
        if !applied {
            debug!(
                "Discarded stale summary #{} for user {}",
                sequence, self.user_id
            );
        }
        applied
    }

    pub fn latest(&self) -> LatestSummary {
        self.latest.borrow().clone()
    }

    /// A receiver that observes every applied result.
    pub fn watch(&self) -> watch::Receiver<LatestSummary> {
        self.latest.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        !self.tokens_guard().is_empty()
    }

    /// Releases all bus subscriptions. Calling it again does nothing.
    pub fn unmount(&self) {
        let tokens: Vec<SubscriptionToken> = self.tokens_guard().drain(..).collect();
        if tokens.is_empty() {
            return;
        }
        for token in tokens {
            self.bus.unsubscribe(token);
        }
        info!("Summary binding unmounted for user {}", self.user_id);
    }
}

impl Drop for SummaryBinding {
    fn drop(&mut self) {
        self.unmount();
    }
}

struct BoardEntry {
    binding: Arc<SummaryBinding>,
    last_used: Instant,
}

/// One live binding per user, mounted on demand and released after it has
/// gone unread for longer than the idle limit.
pub struct SummaryBoard {
    engine: SummaryEngine,
    bus: ChangeBus,
    bindings: DashMap<Uuid, BoardEntry>,
}

impl SummaryBoard {
    pub fn new(engine: SummaryEngine, bus: ChangeBus) -> Self {
        Self {
            engine,
            bus,
            bindings: DashMap::new(),
        }
    }

    /// Returns the user's binding, mounting one if none exists.
    pub async fn mount(&self, user_id: Uuid) -> Arc<SummaryBinding> {
        if let Some(mut existing) = self.bindings.get_mut(&user_id) {
            existing.last_used = Instant::now();
            return existing.binding.clone();
        }

        let fresh = SummaryBinding::mount(user_id, self.engine.clone(), self.bus.clone()).await;
        // A concurrent mount may have won; the loser is dropped and unsubscribes.
        let mut entry = self.bindings.entry(user_id).or_insert(BoardEntry {
            binding: fresh,
            last_used: Instant::now(),
        });
        entry.last_used = Instant::now();
        entry.binding.clone()
    }

    /// Returns whether a binding was mounted.
    pub fn unmount(&self, user_id: Uuid) -> bool {
        match self.bindings.remove(&user_id) {
            Some((_, entry)) => {
                entry.binding.unmount();
                true
            }
            None => false,
        }
    }

    pub fn mounted_count(&self) -> usize {
        self.bindings.len()
    }

    /// Unmounts every binding not read for at least `max_idle` and returns
    /// how many were released.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let is_idle = |entry: &BoardEntry| now.duration_since(entry.last_used) >= max_idle;

        let candidates: Vec<Uuid> = self
            .bindings
            .iter()
            .filter(|entry| is_idle(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        let mut released = 0;
        for user_id in candidates {
            // Re-checked under the shard lock: a read since the scan keeps it.
            if let Some((_, entry)) = self.bindings.remove_if(&user_id, |_, entry| is_idle(entry)) {
                entry.binding.unmount();
                released += 1;
            }
        }
        if released > 0 {
            info!("Released {} idle summary binding(s)", released);
        }
        released
    }

    /// Sweeps idle bindings every `max_idle` until the board is dropped.
    /// `max_idle` must be non-zero. Must be called inside a Tokio runtime.
    pub fn spawn_idle_sweeper(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let board = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(max_idle);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let Some(board) = board.upgrade() else {
                    debug!("Summary board dropped; idle sweeper exiting");
                    return;
                };
                board.sweep_idle(max_idle);
            }
        })
    }
}
