use crate::callbacks::TradingCallbacks;
use apex_book::Decimal;
use apex_execution::{Balance, Order, Position, Trade};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// The event-dispatch thread's suspension point, matching the Clock
/// dispatcher's own polling discretization.
const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// One queued listener invocation. `TradingCore` enqueues these; the
/// dispatch thread drains them and calls the matching [`TradingCallbacks`]
/// method.
#[derive(Debug, Clone)]
pub enum TradingEvent {
    OrderFilled(Order),
    OrderCancelled(Order),
    OrderRejected(Order),
    TradeExecuted(Trade),
    PositionUpdate(Position),
    BalanceUpdate(Balance),
    MarketData {
        symbol: String,
        price: Decimal,
        quantity: Decimal,
        is_bid: bool,
    },
    /// Distinct from `TradeExecuted`: this is the informational `on_trade`
    /// callback fed by `MarketDataRouter::submit_trade_tick`, not a fill
    /// against a client order.
    TickTrade {
        symbol: String,
        price: Decimal,
        quantity: Decimal,
        is_buy: bool,
    },
    Error {
        source: String,
        message: String,
    },
}

/// The FIFO of queued listener invocations `TradingCore` exclusively owns.
///
/// Unbounded by default, per the documented backpressure limitation: a
/// bounded, drop-oldest/drop-new variant is a valid future extension but is
/// not implemented here. The queue has its own mutex (the `receiver` slot
/// below) that is never held together with `TradingCore`'s state lock —
/// `enqueue` only ever touches the channel's `Sender`, which does not lock
/// against the receiver at all.
pub struct EventQueue {
    sender: Sender<TradingEvent>,
    receiver: Arc<Mutex<Option<Receiver<TradingEvent>>>>,
    running: Arc<AtomicBool>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(Some(receiver))),
            running: Arc::new(AtomicBool::new(false)),
            dispatcher: Mutex::new(None),
        }
    }

    /// Enqueues `event` for asynchronous delivery. Never blocks the caller
    /// beyond an `mpsc::Sender::send` (O(1)); if the dispatcher is not
    /// running the event simply waits in the channel until `start` is
    /// called.
    pub fn enqueue(&self, event: TradingEvent) {
        let _ = self.sender.send(event);
    }

    /// Idempotent. Spawns the dispatch thread that drains the queue and
    /// invokes `callbacks` for each event, catching panics so that one
    /// failing callback cannot stop delivery of the rest (the CALLBACK
    /// error kind: caught and dropped).
    pub fn start(&self, callbacks: Arc<dyn TradingCallbacks>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(receiver) = self.receiver.lock().take() else {
            return;
        };
        let running = self.running.clone();
        let receiver_slot = self.receiver.clone();
        let handle = std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                match receiver.recv_timeout(POLL_INTERVAL) {
                    Ok(event) => dispatch(&callbacks, event),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            *receiver_slot.lock() = Some(receiver);
        });
        *self.dispatcher.lock() = Some(handle);
    }

    /// Idempotent. The dispatcher exits at its next poll; any event already
    /// dequeued is allowed to finish delivering — nothing is preempted
    /// mid-callback.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.dispatcher.lock().take() {
            let _ = handle.join();
        }
    }
}

fn dispatch(callbacks: &Arc<dyn TradingCallbacks>, event: TradingEvent) {
    let callbacks = callbacks.clone();
    let _ = catch_unwind(AssertUnwindSafe(move || match event {
        TradingEvent::OrderFilled(order) => callbacks.on_order_filled(&order),
        TradingEvent::OrderCancelled(order) => callbacks.on_order_cancelled(&order),
        TradingEvent::OrderRejected(order) => callbacks.on_order_rejected(&order),
        TradingEvent::TradeExecuted(trade) => callbacks.on_trade_executed(&trade),
        TradingEvent::PositionUpdate(position) => callbacks.on_position_update(&position),
        TradingEvent::BalanceUpdate(balance) => callbacks.on_balance_update(&balance),
        TradingEvent::MarketData { symbol, price, quantity, is_bid } => {
            callbacks.on_market_data(&symbol, price, quantity, is_bid)
        }
        TradingEvent::TickTrade { symbol, price, quantity, is_buy } => {
            callbacks.on_trade(&symbol, price, quantity, is_buy)
        }
        TradingEvent::Error { source, message } => callbacks.on_error(&source, &message),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingCallbacks {
        errors: StdMutex<Vec<(String, String)>>,
        count: AtomicUsize,
    }

    impl TradingCallbacks for RecordingCallbacks {
        fn on_error(&self, source: &str, message: &str) {
            self.errors.lock().unwrap().push((source.to_string(), message.to_string()));
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn queued_events_are_delivered_after_start() {
        let queue = EventQueue::new();
        let callbacks = Arc::new(RecordingCallbacks::default());
        queue.enqueue(TradingEvent::Error { source: "x".into(), message: "y".into() });
        queue.start(callbacks.clone());

        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while callbacks.count.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        queue.stop();

        assert_eq!(callbacks.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn start_and_stop_are_idempotent_and_restart_works() {
        let queue = EventQueue::new();
        let callbacks = Arc::new(RecordingCallbacks::default());
        queue.start(callbacks.clone());
        queue.start(callbacks.clone());
        queue.stop();
        queue.stop();

        queue.enqueue(TradingEvent::Error { source: "a".into(), message: "b".into() });
        queue.start(callbacks.clone());
        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while callbacks.count.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        queue.stop();
        assert_eq!(callbacks.count.load(Ordering::SeqCst), 1);
    }
}
