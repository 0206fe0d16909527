//! Ordered theme-change subscribers.
//!
//! Callbacks are delivered synchronously in subscription order. One failing
//! callback, whether it returns `Err` or panics, is logged and skipped; the rest
//! still receive the theme.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::error::Error;
use crate::logger::Log;
use crate::theme::Theme;

/// Boxed theme-change callback.
pub type ThemeCallback = Box<dyn FnMut(Theme) -> anyhow::Result<()>>;

type SharedCallback = Rc<RefCell<ThemeCallback>>;

/// Opaque handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    /// Id the subscriber is logged under.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Subscribers in the order they subscribed.
#[derive(Default)]
pub struct SubscriberList {
    next_id: u64,
    entries: Vec<(u64, SharedCallback)>,
}

impl SubscriberList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback`; it runs after every earlier subscriber.
    pub fn add(&mut self, callback: ThemeCallback) -> Subscription {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push((id, Rc::new(RefCell::new(callback))));
        Subscription { id }
    }

    /// Remove the subscriber; `false` if it was already gone.
    pub fn remove(&mut self, subscription: &Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != subscription.id);
        self.entries.len() != before
    }

    /// Drop every callback.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the current list to deliver to once the owner's borrow is released.
    ///
    /// Subscribers added or removed during a delivery take effect from the next one.
    pub fn snapshot(&self) -> Delivery {
        Delivery {
            targets: self.entries.clone(),
        }
    }
}

/// A pending notification round.
pub struct Delivery {
    targets: Vec<(u64, SharedCallback)>,
}

impl Delivery {
    /// Call every subscriber with `theme` and return how many failed.
    pub fn deliver(self, theme: Theme) -> usize {
        let mut failures = 0;
        for (id, callback) in &self.targets {
            // Already running further up the stack: a subscriber changed the
            // theme from inside its own callback.
            let Ok(mut callback) = callback.try_borrow_mut() else {
                Log::log_debug(&format!(
                    "Skipping re-entrant delivery to subscriber #{id}"
                ));
                continue;
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (&mut **callback)(theme)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => format!("{e:#}"),
                Err(payload) => panic_message(payload.as_ref()),
            };
            failures += 1;
            Log::log_error(&Error::Subscriber { id: *id, message }.to_string());
        }
        failures
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
