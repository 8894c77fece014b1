//! Counting gate that caps the number of requests in flight
//!
//! The pooled client bounds idle connections per host but not the total
//! number of open connections. The gate covers the latter: a caller blocks in
//! [`ConnectionGate::acquire`] until fewer than `limit` permits are out.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::trace;

#[derive(Debug)]
struct GateState {
    in_flight: usize,
    limit: usize,
}

/// Blocking gate limiting concurrent requests
#[derive(Debug)]
pub struct ConnectionGate {
    state: Mutex<GateState>,
    released: Condvar,
}

impl ConnectionGate {
    /// Create a gate admitting at most `limit` concurrent holders (minimum 1)
    pub fn new(limit: usize) -> Self {
        Self {
            state: Mutex::new(GateState { in_flight: 0, limit: limit.max(1) }),
            released: Condvar::new(),
        }
    }

    /// Block until a slot is free and take it
    pub fn acquire(self: &Arc<Self>) -> GatePermit {
        let mut state = self.state.lock();
        while state.in_flight >= state.limit {
            trace!(in_flight = state.in_flight, limit = state.limit, "waiting for connection slot");
            self.released.wait(&mut state);
        }
        state.in_flight += 1;
        GatePermit { gate: Arc::clone(self) }
    }

    /// Change the limit; permits already handed out stay valid
    pub fn set_limit(&self, limit: usize) {
        let mut state = self.state.lock();
        state.limit = limit.max(1);
        drop(state);
        self.released.notify_all();
    }

    pub fn limit(&self) -> usize {
        self.state.lock().limit
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);
        self.released.notify_one();
    }
}

/// Slot in a [`ConnectionGate`], released on drop
#[derive(Debug)]
pub struct GatePermit {
    gate: Arc<ConnectionGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_permits_are_counted_and_released() {
        let gate = Arc::new(ConnectionGate::new(2));

        let first = gate.acquire();
        let second = gate.acquire();
        assert_eq!(gate.in_flight(), 2);

        drop(first);
        assert_eq!(gate.in_flight(), 1);
        let third = gate.acquire();
        assert_eq!(gate.in_flight(), 2);

        drop(second);
        drop(third);
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let gate = Arc::new(ConnectionGate::new(1));
        let held = gate.acquire();

        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let _permit = gate.acquire();
                gate.in_flight()
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        drop(held);
        assert_eq!(waiter.join().unwrap(), 1);
    }

    #[test]
    fn test_raising_limit_wakes_waiters() {
        let gate = Arc::new(ConnectionGate::new(1));
        let _held = gate.acquire();

        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let _permit = gate.acquire();
            })
        };

        thread::sleep(Duration::from_millis(50));
        gate.set_limit(2);
        waiter.join().unwrap();
        assert_eq!(gate.limit(), 2);
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let gate = ConnectionGate::new(0);
        assert_eq!(gate.limit(), 1);
    }
}
