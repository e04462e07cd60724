//! Timer capability injected into the carousel and page.
//!
//! Timers never call back into their owner. When one fires, a
//! [`TimerFired`] is handed to whoever drives the page, which routes it to
//! `Page::on_timer`. That keeps every state change on one owner.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::events::{Timer, TimerFired, TimerId};

/// Shortest period a repeating timer runs at; zero would spin.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

pub trait Scheduler {
    /// Fire `timer` once after `delay`.
    fn schedule_once(&mut self, timer: Timer, delay: Duration) -> TimerId;

    /// Fire `timer` every `period`, first after one full period.
    fn schedule_repeating(&mut self, timer: Timer, period: Duration) -> TimerId;

    /// Returns `true` if the timer was still pending.
    fn cancel(&mut self, id: TimerId) -> bool;

    fn is_pending(&self, id: TimerId) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    timer: Timer,
    due: Duration,
    period: Option<Duration>,
}

/// Virtual clock for tests and dry runs. Nothing fires until the driver
/// pulls due timers with [`ManualScheduler::fire_next`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerId, Pending>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pop the earliest timer due no later than `until`, moving the clock to
    /// its deadline. Repeating timers are re-armed one period later.
    pub fn fire_next(&mut self, until: Duration) -> Option<TimerFired> {
        let id = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(id, p)| (p.due, **id))
            .map(|(id, _)| *id)?;
        let entry = self.pending.remove(&id)?;
        self.now = self.now.max(entry.due);
        if let Some(period) = entry.period {
            self.pending.insert(
                id,
                Pending {
                    due: entry.due + period,
                    ..entry
                },
            );
        }
        trace!(id = id.0, timer = ?entry.timer, now_ms = self.now.as_millis() as u64, "virtual timer fired");
        Some(TimerFired {
            id,
            timer: entry.timer,
        })
    }

    /// Move the clock forward once no more timers are due.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, timer: Timer, delay: Duration, period: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.insert(
            id,
            Pending {
                timer,
                due: self.now + delay,
                period,
            },
        );
        id
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&mut self, timer: Timer, delay: Duration) -> TimerId {
        self.insert(timer, delay, None)
    }

    fn schedule_repeating(&mut self, timer: Timer, period: Duration) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(timer, period, Some(period))
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }
}

struct Armed {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Real-time timers backed by tokio tasks. Fired timers are sent over a
/// channel; every timer is a child of the scheduler's cancellation token.
pub struct TokioScheduler {
    next_id: u64,
    tx: mpsc::Sender<TimerFired>,
    cancel: CancellationToken,
    armed: HashMap<TimerId, Armed>,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::Sender<TimerFired>, cancel: CancellationToken) -> Self {
        Self {
            next_id: 0,
            tx,
            cancel,
            armed: HashMap::new(),
        }
    }

    /// Scheduler plus the receiving end of its fired-timer channel.
    pub fn channel(cancel: CancellationToken) -> (Self, mpsc::Receiver<TimerFired>) {
        let (tx, rx) = mpsc::channel(16);
        (Self::new(tx, cancel), rx)
    }

    fn next_id(&mut self) -> TimerId {
        // Drop bookkeeping for one-shots that already fired.
        self.armed.retain(|_, armed| !armed.task.is_finished());
        self.next_id += 1;
        TimerId(self.next_id)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&mut self, timer: Timer, delay: Duration) -> TimerId {
        let id = self.next_id();
        let cancel = self.cancel.child_token();
        let tx = self.tx.clone();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = sleep(delay) => {
                        let _ = tx.send(TimerFired { id, timer }).await;
                    }
                }
            }
        });
        self.armed.insert(id, Armed { cancel, task });
        id
    }

    fn schedule_repeating(&mut self, timer: Timer, period: Duration) -> TimerId {
        let period = period.max(MIN_PERIOD);
        let id = self.next_id();
        let cancel = self.cancel.child_token();
        let tx = self.tx.clone();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                let mut ticks = interval_at(Instant::now() + period, period);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticks.tick() => {
                            if tx.send(TimerFired { id, timer }).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });
        self.armed.insert(id, Armed { cancel, task });
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.armed.remove(&id) {
            Some(armed) => {
                armed.cancel.cancel();
                !armed.task.is_finished()
            }
            None => false,
        }
    }

    fn is_pending(&self, id: TimerId) -> bool {
        self.armed
            .get(&id)
            .is_some_and(|armed| !armed.cancel.is_cancelled() && !armed.task.is_finished())
    }
}
