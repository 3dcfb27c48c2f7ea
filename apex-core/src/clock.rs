use crate::scheduler::{fire_ready, Scheduled};
use apex_book::Timestamp;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// How the dispatcher thread waits between polls. Also the Clock dispatcher's
/// suspension point.
const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// A monotonic time source with a scheduler of delayed/recurring callbacks.
///
/// Three modes exist as separate implementors rather than one enum so each
/// can own only the state its mode needs: [`LiveClock`], [`BacktestClock`],
/// [`SimulatedClock`].
pub trait EngineClock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// No-op in LIVE mode.
    fn set_time(&self, t: Timestamp);

    /// No-op in LIVE mode.
    fn advance_time(&self, delta_nanos: i64);

    fn schedule_once(&self, delay_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>);

    fn schedule_recurring(&self, interval_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>);

    /// Idempotent.
    fn start(&self);

    /// Idempotent.
    fn stop(&self);
}

fn epoch_now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as i64
}

/// `now()` tracks real wall-clock time; `set_time`/`advance_time` are silent
/// no-ops per the LIVE-mode restriction on touching virtual time.
pub struct LiveClock {
    origin_instant: Instant,
    origin_nanos: i64,
    scheduled: Arc<Mutex<Vec<Scheduled>>>,
    running: Arc<AtomicBool>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl Default for LiveClock {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveClock {
    pub fn new() -> Self {
        Self {
            origin_instant: Instant::now(),
            origin_nanos: epoch_now_nanos(),
            scheduled: Arc::new(Mutex::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
            dispatcher: Mutex::new(None),
        }
    }
}

impl EngineClock for LiveClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.origin_instant.elapsed().as_nanos() as i64;
        Timestamp::from_nanos(self.origin_nanos + elapsed)
    }

    fn set_time(&self, _t: Timestamp) {}

    fn advance_time(&self, _delta_nanos: i64) {}

    fn schedule_once(&self, delay_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>) {
        self.scheduled.lock().push(Scheduled {
            fire_at: self.now().as_nanos() + delay_nanos,
            interval: None,
            callback,
        });
    }

    fn schedule_recurring(&self, interval_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>) {
        self.scheduled.lock().push(Scheduled {
            fire_at: self.now().as_nanos() + interval_nanos,
            interval: Some(interval_nanos),
            callback,
        });
    }

    fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let running = self.running.clone();
        let scheduled = self.scheduled.clone();
        let origin_instant = self.origin_instant;
        let origin_nanos = self.origin_nanos;
        let handle = std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let now = origin_nanos + origin_instant.elapsed().as_nanos() as i64;
                fire_ready(&mut scheduled.lock(), now);
                std::thread::sleep(POLL_INTERVAL);
            }
        });
        *self.dispatcher.lock() = Some(handle);
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.dispatcher.lock().take() {
            let _ = handle.join();
        }
    }
}

/// Virtual time advanced only by explicit `set_time`/`advance_time`; there is
/// no dispatcher thread, so scheduled callbacks fire inline during those
/// calls, synchronously on the caller's thread.
pub struct BacktestClock {
    virtual_nanos: AtomicI64,
    scheduled: Mutex<Vec<Scheduled>>,
}

impl Default for BacktestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BacktestClock {
    pub fn new() -> Self {
        Self {
            virtual_nanos: AtomicI64::new(0),
            scheduled: Mutex::new(Vec::new()),
        }
    }

    pub fn starting_at(origin: Timestamp) -> Self {
        Self {
            virtual_nanos: AtomicI64::new(origin.as_nanos()),
            scheduled: Mutex::new(Vec::new()),
        }
    }
}

impl EngineClock for BacktestClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.virtual_nanos.load(Ordering::SeqCst))
    }

    fn set_time(&self, t: Timestamp) {
        self.virtual_nanos.store(t.as_nanos(), Ordering::SeqCst);
        fire_ready(&mut self.scheduled.lock(), t.as_nanos());
    }

    fn advance_time(&self, delta_nanos: i64) {
        let now = self.virtual_nanos.fetch_add(delta_nanos, Ordering::SeqCst) + delta_nanos;
        fire_ready(&mut self.scheduled.lock(), now);
    }

    fn schedule_once(&self, delay_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>) {
        self.scheduled.lock().push(Scheduled {
            fire_at: self.now().as_nanos() + delay_nanos,
            interval: None,
            callback,
        });
    }

    fn schedule_recurring(&self, interval_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>) {
        self.scheduled.lock().push(Scheduled {
            fire_at: self.now().as_nanos() + interval_nanos,
            interval: Some(interval_nanos),
            callback,
        });
    }

    fn start(&self) {}

    fn stop(&self) {}
}

/// Virtual time that advances automatically, at `rate` virtual-nanoseconds
/// per real nanosecond, while a dispatcher thread runs; `set_time`/
/// `advance_time` are also honored for manual correction.
pub struct SimulatedClock {
    virtual_nanos: Arc<AtomicI64>,
    rate: f64,
    scheduled: Arc<Mutex<Vec<Scheduled>>>,
    running: Arc<AtomicBool>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedClock {
    pub fn new(rate: f64) -> Self {
        Self {
            virtual_nanos: Arc::new(AtomicI64::new(0)),
            rate,
            scheduled: Arc::new(Mutex::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
            dispatcher: Mutex::new(None),
        }
    }
}

impl EngineClock for SimulatedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.virtual_nanos.load(Ordering::SeqCst))
    }

    fn set_time(&self, t: Timestamp) {
        self.virtual_nanos.store(t.as_nanos(), Ordering::SeqCst);
    }

    fn advance_time(&self, delta_nanos: i64) {
        self.virtual_nanos.fetch_add(delta_nanos, Ordering::SeqCst);
    }

    fn schedule_once(&self, delay_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>) {
        self.scheduled.lock().push(Scheduled {
            fire_at: self.now().as_nanos() + delay_nanos,
            interval: None,
            callback,
        });
    }

    fn schedule_recurring(&self, interval_nanos: i64, callback: Arc<dyn Fn() + Send + Sync>) {
        self.scheduled.lock().push(Scheduled {
            fire_at: self.now().as_nanos() + interval_nanos,
            interval: Some(interval_nanos),
            callback,
        });
    }

    fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let running = self.running.clone();
        let scheduled = self.scheduled.clone();
        let virtual_nanos = self.virtual_nanos.clone();
        let rate = self.rate;
        let handle = std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let advance = (POLL_INTERVAL.as_nanos() as f64 * rate) as i64;
                let now = virtual_nanos.fetch_add(advance, Ordering::SeqCst) + advance;
                fire_ready(&mut scheduled.lock(), now);
                std::thread::sleep(POLL_INTERVAL);
            }
        });
        *self.dispatcher.lock() = Some(handle);
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.dispatcher.lock().take() {
            let _ = handle.join();
        }
    }
}

static GLOBAL_CLOCK: OnceLock<Arc<dyn EngineClock>> = OnceLock::new();

/// Installs the process-wide ambient clock. Only the first call takes
/// effect; later calls are ignored, matching `OnceLock`'s semantics.
pub fn init_global(clock: Arc<dyn EngineClock>) {
    let _ = GLOBAL_CLOCK.set(clock);
}

/// The process-wide ambient clock, defaulting to a fresh [`LiveClock`] if
/// nothing was installed via [`init_global`]. Convenience for call sites
/// (e.g. test helpers) that would otherwise need a `Clock` threaded through
/// by hand; `TradingCore` itself always uses the clock given to it at
/// construction, never this getter.
pub fn global() -> Arc<dyn EngineClock> {
    GLOBAL_CLOCK
        .get_or_init(|| Arc::new(LiveClock::new()) as Arc<dyn EngineClock>)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtest_clock_advances_only_on_explicit_calls() {
        let clock = BacktestClock::new();
        assert_eq!(clock.now().as_nanos(), 0);
        clock.advance_time(1_000);
        assert_eq!(clock.now().as_nanos(), 1_000);
        clock.set_time(Timestamp::from_nanos(5_000));
        assert_eq!(clock.now().as_nanos(), 5_000);
    }

    #[test]
    fn backtest_clock_fires_due_callbacks_on_advance() {
        let clock = BacktestClock::new();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = fired.clone();
        clock.schedule_once(500, Arc::new(move || fired_clone.store(true, Ordering::SeqCst)));
        clock.advance_time(400);
        assert!(!fired.load(Ordering::SeqCst));
        clock.advance_time(200);
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn backtest_clock_recurring_callback_reschedules() {
        let clock = BacktestClock::new();
        let count = Arc::new(AtomicI64::new(0));
        let count_clone = count.clone();
        clock.schedule_recurring(100, Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        clock.advance_time(100);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        clock.advance_time(100);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn live_clock_start_stop_is_idempotent() {
        let clock = LiveClock::new();
        clock.start();
        clock.start();
        clock.stop();
        clock.stop();
    }

    #[test]
    fn live_clock_now_is_monotonically_nondecreasing() {
        let clock = LiveClock::new();
        let a = clock.now();
        std::thread::sleep(Duration::from_millis(1));
        let b = clock.now();
        assert!(b >= a);
    }
}
