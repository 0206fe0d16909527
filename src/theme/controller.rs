//! The theme controller: mode, effective theme, persistence and re-checks.
//!
//! State lives behind `Rc<RefCell<_>>` and is only touched from the owning
//! thread. The periodic re-check is a task on the injected [`Scheduler`] holding
//! a weak reference, so a forgotten timer never keeps a dropped controller alive.
//! Subscribers are always called after the state borrow is released, which lets
//! them query (or even drive) the controller from inside their callback.

use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::constants::{DEFAULT_RECHECK_INTERVAL, THEME_STORAGE_KEY};
use crate::error::Result;
use crate::geo::{FormattedSunTimes, GeoCoordinate, Hemisphere, LocationStore, Season, ThemeChange};
use crate::logger::Log;
use crate::store::PreferenceStore;
use crate::theme::subscribers::{SubscriberList, Subscription};
use crate::theme::{Theme, ThemeMode};
use crate::timer::{Clock, Scheduler, TimerHandle};

/// When a periodic re-check notifies subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecheckNotify {
    /// Only when the effective theme actually changed.
    #[default]
    Changes,
    /// On every tick, changed or not.
    EveryTick,
}

impl RecheckNotify {
    /// The config file spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            RecheckNotify::Changes => "changes",
            RecheckNotify::EveryTick => "every_tick",
        }
    }
}

/// Tunables for [`ThemeController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub recheck_interval: Duration,
    pub recheck_notify: RecheckNotify,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            recheck_interval: Duration::seconds(DEFAULT_RECHECK_INTERVAL as i64),
            recheck_notify: RecheckNotify::default(),
        }
    }
}

struct ControllerState {
    mode: ThemeMode,
    effective: Theme,
    location: LocationStore,
    subscribers: SubscriberList,
    timer: Option<TimerHandle>,
}

struct Shared {
    state: RefCell<ControllerState>,
    clock: Rc<dyn Clock>,
    store: Box<dyn PreferenceStore>,
    options: ControllerOptions,
}

impl Shared {
    fn resolve(&self, mode: ThemeMode, location: &LocationStore) -> Theme {
        mode.fixed_theme()
            .unwrap_or_else(|| location.current_theme_signal(self.clock.now()))
    }

    fn notify(&self, theme: Theme) {
        let delivery = self.state.borrow().subscribers.snapshot();
        delivery.deliver(theme);
    }

    /// One periodic re-evaluation. Never changes the mode.
    fn recheck(&self) {
        let (theme, changed) = {
            let mut state = self.state.borrow_mut();
            if state.mode != ThemeMode::Auto {
                return;
            }
            let theme = self.resolve(ThemeMode::Auto, &state.location);
            let changed = theme != state.effective;
            state.effective = theme;
            (theme, changed)
        };

        if changed {
            Log::log_info(&format!("Sun-based theme is now {theme}"));
        }
        if changed || self.options.recheck_notify == RecheckNotify::EveryTick {
            self.notify(theme);
        }
    }

    fn persist(&self, mode: ThemeMode) {
        if let Err(e) = self.store.set(THEME_STORAGE_KEY, mode.as_str()) {
            Log::log_error(&format!("{e}"));
        }
    }
}

/// Resolves and publishes the dashboard theme.
pub struct ThemeController {
    shared: Rc<Shared>,
    scheduler: Rc<dyn Scheduler>,
}

impl ThemeController {
    /// Create a controller, restoring the persisted mode.
    ///
    /// A missing, unreadable or unrecognised preference falls back to Auto. In
    /// Auto mode the re-check timer starts immediately.
    ///
    /// # Arguments
    /// * `location` - Coordinate and offset source driving Auto mode
    /// * `store` - Where the chosen mode is persisted
    /// * `scheduler` - Runs the periodic re-check
    /// * `clock` - Source of "now" for every sun calculation
    /// * `options` - Re-check interval and notification policy
    pub fn new(
        location: LocationStore,
        store: Box<dyn PreferenceStore>,
        scheduler: Rc<dyn Scheduler>,
        clock: Rc<dyn Clock>,
        options: ControllerOptions,
    ) -> Self {
        let mode = load_mode(store.as_ref());
        let shared = Rc::new(Shared {
            state: RefCell::new(ControllerState {
                mode,
                effective: Theme::Light,
                location,
                subscribers: SubscriberList::new(),
                timer: None,
            }),
            clock,
            store,
            options,
        });

        {
            let mut state = shared.state.borrow_mut();
            state.effective = shared.resolve(mode, &state.location);
        }

        let controller = Self { shared, scheduler };
        controller.start_auto_recheck();
        controller
    }

    /// The user's chosen mode.
    pub fn mode(&self) -> ThemeMode {
        self.shared.state.borrow().mode
    }

    /// The theme currently applied.
    pub fn effective_theme(&self) -> Theme {
        self.shared.state.borrow().effective
    }

    /// Switch mode, persist it, and notify every subscriber once.
    ///
    /// A failed write is logged and the in-memory mode still changes. Entering
    /// Auto (re)starts the re-check timer; Light and Dark cancel it.
    pub fn set_mode(&self, mode: ThemeMode) {
        let theme = {
            let mut state = self.shared.state.borrow_mut();
            state.mode = mode;
            let theme = self.shared.resolve(mode, &state.location);
            state.effective = theme;
            theme
        };
        self.shared.persist(mode);
        Log::log_debug(&format!("Theme mode set to {mode} (showing {theme})"));

        // Settle the timer first: a subscriber may set another mode from its callback
        if mode == ThemeMode::Auto {
            self.start_auto_recheck();
        } else {
            self.cancel_timer();
        }

        self.shared.notify(theme);
    }

    /// Flip to the opposite of what should be shown right now. Always leaves Auto.
    ///
    /// In Auto the sun signal is re-evaluated first, so a sunrise or sunset that
    /// the re-check timer has not picked up yet still counts.
    pub fn toggle(&self) {
        let shown = {
            let state = self.shared.state.borrow();
            self.shared.resolve(state.mode, &state.location)
        };
        self.set_mode(ThemeMode::from(shown.opposite()));
    }

    /// Register a callback for theme changes. Callbacks run in subscription order.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Theme) -> anyhow::Result<()> + 'static,
    {
        let subscription = self
            .shared
            .state
            .borrow_mut()
            .subscribers
            .add(Box::new(callback));
        Log::log_debug(&format!("Subscriber #{} added", subscription.id()));
        subscription
    }

    /// Remove a callback; `false` if the handle was already unsubscribed.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let removed = self
            .shared
            .state
            .borrow_mut()
            .subscribers
            .remove(subscription);
        if removed {
            Log::log_debug(&format!("Subscriber #{} removed", subscription.id()));
        }
        removed
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.shared.state.borrow().subscribers.len()
    }

    /// (Re)schedule the periodic re-check. Does nothing outside Auto mode.
    pub fn start_auto_recheck(&self) {
        if self.mode() != ThemeMode::Auto {
            return;
        }
        self.cancel_timer();

        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let handle = self.scheduler.schedule_repeating(
            self.shared.options.recheck_interval,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.recheck();
                }
            }),
        );
        Log::log_debug(&format!(
            "Re-check timer #{} scheduled every {}s",
            handle.id(),
            self.shared.options.recheck_interval.num_seconds()
        ));
        self.shared.state.borrow_mut().timer = Some(handle);
    }

    /// Whether the periodic re-check is scheduled.
    pub fn is_recheck_active(&self) -> bool {
        self.shared
            .state
            .borrow()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_cancelled())
    }

    /// Stop the timer and drop every subscriber.
    pub fn shutdown(&self) {
        self.cancel_timer();
        self.shared.state.borrow_mut().subscribers.clear();
        Log::log_debug("Theme controller shut down");
    }

    // ═══ Location ═══

    /// Move the dashboard. In Auto mode the theme is re-derived and subscribers
    /// are notified if it changed. Invalid coordinates leave everything as it was.
    pub fn update_location(
        &self,
        latitude: f64,
        longitude: f64,
        timezone: Option<String>,
    ) -> Result<()> {
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            state
                .location
                .update_position(latitude, longitude, timezone)?;
            if state.mode != ThemeMode::Auto {
                None
            } else {
                let theme = self.shared.resolve(ThemeMode::Auto, &state.location);
                let changed = theme != state.effective;
                state.effective = theme;
                changed.then_some(theme)
            }
        };

        if let Some(theme) = changed {
            self.shared.notify(theme);
        }
        Ok(())
    }

    /// A copy of the current coordinate.
    pub fn coordinate(&self) -> GeoCoordinate {
        self.shared.state.borrow().location.coordinate().clone()
    }

    /// Whether the sun is up right now at the stored location.
    pub fn is_daytime(&self) -> bool {
        let now = self.shared.clock.now();
        self.shared.state.borrow().location.is_daytime(now)
    }

    /// Time until the sun signal next flips, counted from now.
    pub fn time_until_theme_change(&self) -> ThemeChange {
        let now = self.shared.clock.now();
        self.shared
            .state
            .borrow()
            .location
            .time_until_theme_change(now)
    }

    /// Sunrise and sunset on `date` as "HH:MM"; polar dates return an error.
    pub fn formatted_sun_times(&self, date: NaiveDate) -> Result<FormattedSunTimes> {
        self.shared.state.borrow().location.formatted_sun_times(date)
    }

    /// Hours of daylight on `date`.
    pub fn day_length(&self, date: NaiveDate) -> f64 {
        self.shared.state.borrow().location.day_length(date)
    }

    /// Display name of the stored location.
    pub fn location_name(&self) -> String {
        self.shared.state.borrow().location.location_name()
    }

    /// Season on `date` at the stored location's hemisphere.
    pub fn season(&self, date: NaiveDate) -> Season {
        self.shared.state.borrow().location.season(date)
    }

    /// Hemisphere of the stored location.
    pub fn hemisphere(&self) -> Hemisphere {
        self.shared.state.borrow().location.hemisphere()
    }

    /// Today's date at the stored location.
    pub fn local_date(&self) -> NaiveDate {
        let now = self.shared.clock.now();
        self.shared
            .state
            .borrow()
            .location
            .local_time(now)
            .date_naive()
    }

    fn cancel_timer(&self) {
        let timer = self.shared.state.borrow_mut().timer.take();
        if let Some(timer) = timer {
            timer.cancel();
            Log::log_debug(&format!("Re-check timer #{} cancelled", timer.id()));
        }
    }
}

impl Drop for ThemeController {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn load_mode(store: &dyn PreferenceStore) -> ThemeMode {
    match store.get(THEME_STORAGE_KEY) {
        Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
            Log::log_warning(&format!("Ignoring stored theme preference: {e}"));
            ThemeMode::Auto
        }),
        Ok(None) => ThemeMode::Auto,
        Err(e) => {
            Log::log_error(&format!("{e}"));
            ThemeMode::Auto
        }
    }
}
