//! Outbound request rate limiting.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep_until};

const PERMITS_PER_WINDOW: u32 = 30;
const WINDOW: Duration = Duration::from_secs(1);
const QUEUE_CAPACITY: usize = 200;

/// Outcome of asking the limiter for one outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A permit was free in the current window.
    Granted,
    /// The attempt waited in the queue and a later window admitted it.
    QueuedGranted,
    /// The wait queue was full; the attempt counts as failed.
    Rejected,
}

impl Admission {
    pub fn is_granted(self) -> bool {
        !matches!(self, Admission::Rejected)
    }
}

struct State {
    window_start: Instant,
    used: u32,
    queue: VecDeque<oneshot::Sender<()>>,
}

/// Fixed-window rate limiter with a bounded FIFO wait queue.
///
/// Waiters park on a oneshot channel in arrival order. There is no
/// background task: every caller rolls the window on entry, and queued
/// waiters wake at each window boundary to roll it themselves. When the
/// window rolls over, the fresh permits go to the oldest queued waiters
/// first; new arrivals cannot jump a non-empty queue.
pub struct FixedWindowLimiter {
    permits_per_window: u32,
    window: Duration,
    queue_capacity: usize,
    state: Mutex<State>,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl FixedWindowLimiter {
    pub fn new(permits_per_window: u32, window: Duration, queue_capacity: usize) -> Self {
        assert!(permits_per_window > 0, "a window must admit something");
        assert!(window > Duration::ZERO, "the window must have a length");
        Self {
            permits_per_window,
            window,
            queue_capacity,
            state: Mutex::new(State {
                window_start: Instant::now(),
                used: 0,
                queue: VecDeque::new(),
            }),
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Asks for one outbound request, suspending while queued. Dropping the
    /// returned future while queued gives the spot up without consuming a
    /// permit.
    pub async fn acquire(&self) -> Admission {
        let mut rx = {
            let mut state = self.state.lock().expect("limiter state poisoned");
            self.roll(&mut state, Instant::now());

            if state.queue.is_empty() && state.used < self.permits_per_window {
                state.used += 1;
                self.admitted.fetch_add(1, Ordering::Relaxed);
                return Admission::Granted;
            }
            if state.queue.len() >= self.queue_capacity {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                return Admission::Rejected;
            }

            let (tx, rx) = oneshot::channel();
            state.queue.push_back(tx);
            rx
        };

        loop {
            let boundary = {
                let state = self.state.lock().expect("limiter state poisoned");
                state.window_start + self.window
            };

            tokio::select! {
                granted = &mut rx => {
                    return match granted {
                        Ok(()) => {
                            self.admitted.fetch_add(1, Ordering::Relaxed);
                            Admission::QueuedGranted
                        }
                        // Sender gone without a grant: the limiter was torn
                        // down while we waited.
                        Err(_) => Admission::Rejected,
                    };
                }
                _ = sleep_until(boundary) => {
                    let mut state = self.state.lock().expect("limiter state poisoned");
                    self.roll(&mut state, Instant::now());
                }
            }
        }
    }

    /// Advances the window if `now` has passed its end and hands the fresh
    /// permits to the oldest queued waiters.
    fn roll(&self, state: &mut State, now: Instant) {
        if now < state.window_start + self.window {
            return;
        }

        let elapsed = now.duration_since(state.window_start);
        let windows_passed = (elapsed.as_nanos() / self.window.as_nanos()) as u32;
        state.window_start += self.window * windows_passed;
        state.used = 0;

        while state.used < self.permits_per_window {
            match state.queue.pop_front() {
                // A waiter that dropped out of the queue consumes no permit.
                Some(waiter) => {
                    if waiter.send(()).is_ok() {
                        state.used += 1;
                    }
                }
                None => break,
            }
        }
    }

    /// Attempts admitted so far, immediately or after queuing.
    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    /// Attempts turned away because the queue was full.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    fn queued(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }
}

impl Default for FixedWindowLimiter {
    /// Limiter sized for the upstream API: 30 requests per second with room
    /// for 200 queued attempts.
    fn default() -> Self {
        Self::new(PERMITS_PER_WINDOW, WINDOW, QUEUE_CAPACITY)
    }
}
