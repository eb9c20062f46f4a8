//! Per-key deduplication of concurrent loads ("single flight")
//!
//! When several callers ask for the same missing key at once, only the
//! first one runs the expensive job; the rest block until it finishes
//! and receive the identical result. Calls that arrive after a job has
//! completed start a fresh one.
//!
//! The bookkeeping map is guarded by a short-held mutex; the job itself
//! runs without it, so loads for unrelated keys never block each other.

use meshcache_core::Result;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

/// One in-flight (or just-finished) job.
struct Call<T> {
    /// `None` while the job is running; waiters sleep on `done`.
    result: Mutex<Option<Result<T>>>,
    done: Condvar,
}

/// Deduplicates concurrent jobs keyed by string.
pub struct FlightGroup<T> {
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

impl<T: Clone> FlightGroup<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Run `job` for `key`, unless a call for `key` is already in
    /// flight, in which case block until that call completes and
    /// return its result instead.
    ///
    /// For any set of overlapping `work` calls with the same key, the
    /// job executes exactly once and every caller observes the same
    /// value or error. `work` itself never fails except by propagating
    /// the job's error.
    pub fn work<F>(&self, key: &str, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(existing) = calls.get(key) {
                let existing = Arc::clone(existing);
                drop(calls);
                return Self::wait(&existing);
            }
            let call = Arc::new(Call {
                result: Mutex::new(None),
                done: Condvar::new(),
            });
            calls.insert(key.to_string(), Arc::clone(&call));
            call
        };

        // Ends the generation even if the job unwinds, so a later
        // caller starts a fresh one instead of waiting forever.
        let _cleanup = Cleanup {
            calls: &self.calls,
            key,
        };

        // Run the job outside the bookkeeping lock.
        let result = job();

        {
            let mut slot = call.result.lock();
            *slot = Some(result.clone());
            call.done.notify_all();
        }

        result
    }

    fn wait(call: &Call<T>) -> Result<T> {
        let mut slot = call.result.lock();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            call.done.wait(&mut slot);
        }
    }
}

/// Removes a key's call from the bookkeeping map when the leader is
/// done with it, on the normal path and on unwind alike.
struct Cleanup<'a, T> {
    calls: &'a Mutex<HashMap<String, Arc<Call<T>>>>,
    key: &'a str,
}

impl<T> Drop for Cleanup<'_, T> {
    fn drop(&mut self) {
        self.calls.lock().remove(self.key);
    }
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}
