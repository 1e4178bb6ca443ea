//! Cooperative goroutine/WaitGroup substrate (spec.md §4.F).
//!
//! `go(callable, ...args)` spawns a lightweight task and returns immediately;
//! `WaitGroup` is a counting barrier. Per spec.md §9's resolved open
//! question, extra arguments to `go()` are passed to the callable
//! positionally, in the order given.
//!
//! Values captured by a spawned task cross a real OS thread boundary the
//! same way a generator's yielded values do — see the safety note in
//! `generator.rs`; the justification here is simpler, since a goroutine body
//! runs to completion unsupervised rather than rendezvousing value-by-value,
//! so there's no concurrent access to guard against at all, only the initial
//! handoff of its argument vector.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::core::value::Value;

struct SendBox<T>(T);
// SAFETY: the boxed value is produced on the spawning thread and consumed
// exactly once, on the new thread, before the spawning thread touches it
// again (if at all) — never shared.
unsafe impl<T> Send for SendBox<T> {}

/// A spawned task's invocation: bound callable name/args plus the closure
/// the host VM supplies to actually run it (mirrors `ProducerBody` in
/// `generator.rs` — arguments cross the thread boundary as an opaque,
/// `Send`-asserted bundle; the closure constructs any `Value`s it needs to
/// report back to the runtime on the new thread).
pub type GoroutineBody = Box<dyn FnOnce(Vec<Value>) + Send>;

/// An opaque handle to a spawned goroutine. Dropping it detaches the task
/// (PHP's `go()` does not return a joinable handle — see spec.md §4.F); this
/// just keeps the `JoinHandle` alive so the process can still be asked to
/// join all outstanding goroutines at shutdown via [`Goroutine::join`].
pub struct Goroutine {
    handle: Option<JoinHandle<()>>,
}

impl Goroutine {
    pub fn join(mut self) {
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Spawn `body` on its own OS thread with `args` bound positionally.
pub fn go(args: Vec<Value>, body: GoroutineBody) -> Goroutine {
    let boxed = SendBox(args);
    let handle = std::thread::spawn(move || {
        let SendBox(args) = boxed;
        body(args);
    });
    Goroutine { handle: Some(handle) }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitGroupError {
    #[error("sync: negative WaitGroup counter")]
    NegativeCounter,
}

struct WaitGroupState {
    count: i64,
}

/// A counting barrier: `add(delta)`/`done()`/`wait()` (spec.md §4.F).
/// `Arc`-shared so every goroutine holding a clone observes the same
/// counter; `Condvar` wakes `wait()` callers as soon as the count reaches 0.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<(Mutex<WaitGroupState>, Condvar)>,
}

impl WaitGroup {
    pub fn new() -> Self {
        WaitGroup {
            inner: Arc::new((Mutex::new(WaitGroupState { count: 0 }), Condvar::new())),
        }
    }

    pub fn add(&self, delta: i64) -> Result<(), WaitGroupError> {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().unwrap();
        state.count += delta;
        if state.count < 0 {
            return Err(WaitGroupError::NegativeCounter);
        }
        if state.count == 0 {
            cvar.notify_all();
        }
        Ok(())
    }

    pub fn done(&self) -> Result<(), WaitGroupError> {
        self.add(-1)
    }

    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().unwrap();
        while state.count > 0 {
            state = cvar.wait(state).unwrap();
        }
    }

    pub fn count(&self) -> i64 {
        self.inner.0.lock().unwrap().count
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn wait_group_blocks_until_all_done_scenario_s7() {
        let wg = WaitGroup::new();
        wg.add(3).unwrap();
        let (tx, rx) = mpsc::channel();
        let mut handles = Vec::new();
        for i in 0..3 {
            let wg = wg.clone();
            let tx = tx.clone();
            handles.push(go(
                vec![Value::Int(i)],
                Box::new(move |args| {
                    tx.send(args[0].to_int()).unwrap();
                    wg.done().unwrap();
                }),
            ));
        }
        wg.wait();
        let mut seen: Vec<i64> = rx.try_iter().collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
        for h in handles {
            h.join();
        }
    }

    #[test]
    fn add_below_zero_is_an_error() {
        let wg = WaitGroup::new();
        assert_eq!(wg.add(-1), Err(WaitGroupError::NegativeCounter));
    }

    #[test]
    fn wait_returns_immediately_when_counter_already_zero() {
        let wg = WaitGroup::new();
        wg.wait();
    }

    #[test]
    fn goroutine_receives_positional_args() {
        let (tx, rx) = mpsc::channel();
        let g = go(
            vec![Value::Int(1), Value::str("two")],
            Box::new(move |args| {
                tx.send((args[0].to_int(), args[1].to_php_string())).unwrap();
            }),
        );
        g.join();
        let (i, s) = rx.recv().unwrap();
        assert_eq!(i, 1);
        assert_eq!(s, b"two");
    }
}
