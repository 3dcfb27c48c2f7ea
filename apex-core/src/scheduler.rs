use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// One scheduled callback, either one-shot or recurring, shared by all three
/// [`crate::clock::EngineClock`] implementations.
pub(crate) struct Scheduled {
    pub(crate) fire_at: i64,
    pub(crate) interval: Option<i64>,
    pub(crate) callback: Arc<dyn Fn() + Send + Sync>,
}

/// Fires every entry in `list` whose `fire_at <= now`, catching panics so one
/// misbehaving callback can't take down the dispatcher. Recurring entries are
/// rescheduled; a recurring entry that has missed more than one interval is
/// coalesced to a single catch-up delivery rather than firing once per missed
/// tick.
pub(crate) fn fire_ready(list: &mut Vec<Scheduled>, now: i64) {
    let mut due = Vec::new();
    let mut i = 0;
    while i < list.len() {
        if list[i].fire_at <= now {
            due.push(list.remove(i));
        } else {
            i += 1;
        }
    }

    for mut scheduled in due {
        invoke(&scheduled.callback);
        if let Some(interval) = scheduled.interval {
            let mut next_fire = scheduled.fire_at + interval;
            if next_fire <= now {
                next_fire = now + interval;
            }
            scheduled.fire_at = next_fire;
            list.push(scheduled);
        }
    }
}

fn invoke(callback: &Arc<dyn Fn() + Send + Sync>) {
    let _ = catch_unwind(AssertUnwindSafe(|| callback()));
}
