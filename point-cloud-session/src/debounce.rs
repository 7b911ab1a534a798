//! Trailing-edge debouncing keyed on a generation counter.
//!
//! Every request bumps the generation and pushes the deadline out by the
//! quiet period. Only the newest generation can fire; anything older is a
//! no-op when its turn comes.
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// The one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub generation: u64,
    pub due: Instant,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    generation: u64,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: 0,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    /// Supersede whatever is pending with a new request due after the quiet period.
    pub fn request(&mut self, now: Instant) -> Pending {
        self.generation += 1;
        let pending = Pending {
            generation: self.generation,
            due: now + self.quiet,
        };
        self.pending = Some(pending);
        pending
    }

    /// Consume the pending request if it is `generation`. Stale generations
    /// return false and leave the newer request in place.
    pub fn fire_if_current(&mut self, generation: u64) -> bool {
        match self.pending {
            Some(pending) if pending.generation == generation => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the pending request if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<u64> {
        let pending = self.pending.filter(|pending| pending.due <= now)?;
        self.pending = None;
        Some(pending.generation)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

struct TimerSlot {
    pending: Option<Pending>,
    shutdown: bool,
}

struct TimerShared {
    slot: Mutex<TimerSlot>,
    wake: Condvar,
}

impl TimerShared {
    fn lock(&self) -> MutexGuard<'_, TimerSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background thread that sleeps until the newest armed deadline and then
/// hands its generation to a callback. Arming again before the deadline
/// replaces the earlier request.
pub struct DebounceTimer {
    shared: Arc<TimerShared>,
    worker: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    pub fn spawn<F>(on_fire: F) -> std::io::Result<Self>
    where
        F: FnMut(u64) + Send + 'static,
    {
        let shared = Arc::new(TimerShared {
            slot: Mutex::new(TimerSlot {
                pending: None,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });
        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("slice-debounce".to_string())
                .spawn(move || run_timer(&shared, on_fire))?
        };
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    pub fn arm(&self, pending: Pending) {
        self.shared.lock().pending = Some(pending);
        self.shared.wake.notify_one();
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_one();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Debounce timer thread panicked");
            }
        }
    }
}

fn run_timer<F: FnMut(u64)>(shared: &TimerShared, mut on_fire: F) {
    let mut slot = shared.lock();
    loop {
        if slot.shutdown {
            return;
        }
        let pending = slot.pending;
        match pending {
            None => {
                slot = shared.wake.wait(slot).unwrap_or_else(PoisonError::into_inner);
            }
            Some(pending) => {
                let now = Instant::now();
                if now >= pending.due {
                    slot.pending = None;
                    drop(slot);
                    on_fire(pending.generation);
                    slot = shared.lock();
                } else {
                    slot = shared
                        .wake
                        .wait_timeout(slot, pending.due - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const QUIET: Duration = Duration::from_millis(50);

    #[test]
    fn burst_collapses_to_the_last_request() {
        let mut debouncer = Debouncer::new(QUIET);
        let start = Instant::now();
        let first = debouncer.request(start);
        let second = debouncer.request(start + Duration::from_millis(20));
        let last = debouncer.request(start + Duration::from_millis(40));

        assert!(!debouncer.fire_if_current(first.generation));
        assert!(!debouncer.fire_if_current(second.generation));
        assert!(debouncer.fire_if_current(last.generation));
        assert!(!debouncer.fire_if_current(last.generation));
    }

    #[test]
    fn deadline_trails_the_newest_request() {
        let mut debouncer = Debouncer::new(QUIET);
        let start = Instant::now();
        debouncer.request(start);
        let last = debouncer.request(start + Duration::from_millis(30));

        // The first request's deadline no longer applies.
        assert_eq!(debouncer.take_due(start + Duration::from_millis(60)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(80)), Some(last.generation));
        assert_eq!(debouncer.pending(), None);
    }

    #[test]
    fn cancel_drops_the_pending_request() {
        let mut debouncer = Debouncer::new(QUIET);
        let pending = debouncer.request(Instant::now());
        debouncer.cancel();
        assert!(!debouncer.fire_if_current(pending.generation));
    }

    #[test]
    fn timer_fires_once_for_a_burst() {
        let (tx, rx) = mpsc::channel();
        let timer = DebounceTimer::spawn(move |generation| {
            let _ = tx.send(generation);
        })
        .unwrap();
        let mut debouncer = Debouncer::new(QUIET);

        for _ in 0..5 {
            timer.arm(debouncer.request(Instant::now()));
            thread::sleep(Duration::from_millis(2));
        }

        let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(fired, 5);
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
    }

    #[test]
    fn dropping_the_timer_stops_the_thread() {
        let timer = DebounceTimer::spawn(|_| {}).unwrap();
        timer.arm(Pending {
            generation: 1,
            due: Instant::now() + Duration::from_secs(60),
        });
        drop(timer);
    }
}
