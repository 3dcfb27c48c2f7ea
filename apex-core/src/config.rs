use crate::callbacks::TradingCallbacks;
use crate::clock::{BacktestClock, EngineClock, LiveClock, SimulatedClock};
use apex_book::Timestamp;
use apex_risk::RiskLimits;
use std::sync::Arc;

/// Which `EngineClock` implementation `TradingCore::initialize` installs.
#[derive(Debug, Clone, Copy)]
pub enum ClockMode {
    Live,
    /// `origin` seeds the virtual clock; `None` starts it at nanosecond 0.
    Backtest { origin: Option<Timestamp> },
    /// Virtual time advances automatically at `rate` virtual-nanoseconds
    /// per real nanosecond while the dispatcher runs; the caller picks the
    /// rate explicitly rather than relying on a hidden default.
    Simulated { rate: f64 },
}

impl ClockMode {
    pub(crate) fn build_clock(self) -> Arc<dyn EngineClock> {
        match self {
            ClockMode::Live => Arc::new(LiveClock::new()),
            ClockMode::Backtest { origin: Some(t) } => Arc::new(BacktestClock::starting_at(t)),
            ClockMode::Backtest { origin: None } => Arc::new(BacktestClock::new()),
            ClockMode::Simulated { rate } => Arc::new(SimulatedClock::new(rate)),
        }
    }
}

/// Construction-time configuration for `TradingCore::initialize`.
///
/// This is in-process configuration handed to `initialize()` by the
/// embedding application, not file/env parsing — that remains a venue
/// adapter's or CLI front-end's job.
pub struct TradingCoreConfig {
    pub clock_mode: ClockMode,
    pub risk_limits: RiskLimits,
    pub callbacks: Option<Arc<dyn TradingCallbacks>>,
}

impl std::fmt::Debug for TradingCoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingCoreConfig")
            .field("clock_mode", &self.clock_mode)
            .field("risk_limits", &self.risk_limits)
            .field("callbacks", &self.callbacks.is_some())
            .finish()
    }
}

impl Default for TradingCoreConfig {
    fn default() -> Self {
        Self {
            clock_mode: ClockMode::Live,
            risk_limits: RiskLimits::default(),
            callbacks: None,
        }
    }
}

/// Fluent builder over [`TradingCoreConfig`].
#[derive(Default)]
pub struct TradingCoreConfigBuilder {
    config: TradingCoreConfig,
}

impl TradingCoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock_mode(mut self, mode: ClockMode) -> Self {
        self.config.clock_mode = mode;
        self
    }

    pub fn risk_limits(mut self, limits: RiskLimits) -> Self {
        self.config.risk_limits = limits;
        self
    }

    pub fn callbacks(mut self, callbacks: Arc<dyn TradingCallbacks>) -> Self {
        self.config.callbacks = Some(callbacks);
        self
    }

    pub fn build(self) -> TradingCoreConfig {
        self.config
    }
}
