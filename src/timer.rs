//! Clock and repeating-timer abstractions.
//!
//! Everything here is single-threaded. [`TimerQueue`] does not spawn anything:
//! the owner calls [`TimerQueue::run_due`] from its own loop and due tasks run
//! right there, on the owning thread. Tests drive it with a [`ManualClock`] and
//! never sleep.

use chrono::{DateTime, Duration, Utc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Source of "now".
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    /// A clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Jump to `at`, backwards included.
    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Cancellation handle for a scheduled task.
///
/// Cancelling stops future runs. A run already in progress completes.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: u64,
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle {
    /// Queue-unique id, shown in debug logs.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop future runs. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Whether [`TimerHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Something that can run a task repeatedly.
pub trait Scheduler {
    /// Run `task` every `interval`, first one interval from now, until the
    /// returned handle is cancelled.
    fn schedule_repeating(&self, interval: Duration, task: Box<dyn FnMut()>) -> TimerHandle;
}

struct TimerEntry {
    interval: Duration,
    next_due: DateTime<Utc>,
    cancelled: Rc<Cell<bool>>,
    task: Box<dyn FnMut()>,
}

/// Cooperative scheduler driven by explicit calls to [`TimerQueue::run_due`].
pub struct TimerQueue {
    clock: Rc<dyn Clock>,
    entries: RefCell<Vec<TimerEntry>>,
    next_id: Cell<u64>,
}

impl TimerQueue {
    /// An empty queue reading time from `clock`.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Run every task due at the clock's current time.
    pub fn run_pending(&self) -> usize {
        self.run_due(self.clock.now())
    }

    /// Run every task whose due time is at or before `now` and return how many ran.
    ///
    /// Each task runs at most once per call. Missed intervals are coalesced:
    /// the next run is one interval after `now`. Tasks may schedule or cancel
    /// other tasks while running.
    pub fn run_due(&self, now: DateTime<Utc>) -> usize {
        self.prune();

        // Take due entries out so tasks can call back into the queue
        let mut due = {
            let mut entries = self.entries.borrow_mut();
            let (due, pending): (Vec<_>, Vec<_>) =
                entries.drain(..).partition(|entry| entry.next_due <= now);
            *entries = pending;
            due
        };

        let mut ran = 0;
        for entry in due.iter_mut() {
            if entry.cancelled.get() {
                continue;
            }
            (entry.task)();
            ran += 1;
            entry.next_due = now + entry.interval;
        }

        let mut entries = self.entries.borrow_mut();
        entries.extend(due.into_iter().filter(|entry| !entry.cancelled.get()));
        ran
    }

    /// Earliest due time among live tasks.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| !entry.cancelled.get())
            .map(|entry| entry.next_due)
            .min()
    }

    /// Number of live (not cancelled) tasks.
    pub fn active_count(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| !entry.cancelled.get())
            .count()
    }

    fn prune(&self) {
        self.entries
            .borrow_mut()
            .retain(|entry| !entry.cancelled.get());
    }
}

impl Scheduler for TimerQueue {
    fn schedule_repeating(&self, interval: Duration, task: Box<dyn FnMut()>) -> TimerHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let cancelled = Rc::new(Cell::new(false));
        self.entries.borrow_mut().push(TimerEntry {
            interval,
            next_due: self.clock.now() + interval,
            cancelled: Rc::clone(&cancelled),
            task,
        });
        TimerHandle { id, cancelled }
    }
}
