//! The generator / `Iterator` rendezvous substrate (spec.md §4.E) — the
//! hardest component in the core.
//!
//! A PHP generator function must not run its body when called; it returns a
//! `Generator` object whose body executes lazily, one `yield` at a time,
//! driven by `Iterator`-shaped method calls. Per spec.md §9's design note,
//! option (a) is used: the producer body runs on a dedicated worker thread
//! and rendezvous with the consumer over a pair of zero-capacity
//! `sync_channel`s — exactly the "one-slot channel" spec.md describes,
//! since a zero-capacity `sync_channel` blocks the sender until the
//! receiver takes the value, and vice versa.
//!
//! # Safety
//!
//! `Value` holds `Rc`/`Rc<RefCell<_>>`, which are `!Send`. The rendezvous
//! protocol below guarantees that at any instant exactly one of
//! {consumer, producer} is runnable (spec.md §4.E) — the other is blocked
//! on a zero-capacity channel recv/send, which is also a synchronizes-with
//! edge. So a `Value` crossing the channel is never observed from two
//! threads at once, and handing one off is sound even though `Value` itself
//! isn't `Send`. `SendBox` documents and localizes that argument instead of
//! scattering `unsafe` through the rest of the module.

use std::sync::mpsc::{sync_channel, Receiver, RecvError, SyncSender};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::core::value::Value;

struct SendBox<T>(T);
// SAFETY: see module doc — exclusive access is enforced by the rendezvous
// protocol's strict alternation, not by this wrapper.
unsafe impl<T> Send for SendBox<T> {}

enum ToProducer {
    Next(SendBox<Value>),
    Throw(SendBox<Value>),
    Cancel,
}

enum FromProducer {
    Yielded {
        key: Option<SendBox<Value>>,
        value: SendBox<Value>,
    },
    Returned(SendBox<Value>),
    Threw(SendBox<Value>),
    Cancelled,
}

/// What the producer observes when it calls [`GeneratorControl::yield_value`].
pub enum Resumption {
    /// The consumer called `next()`/`send(v)`; carries `v` (`Null` for `next`).
    Value(Value),
    /// The consumer called `throw(e)`.
    Thrown(Value),
    /// The generator's last handle was dropped; unwind and release resources.
    Cancelled,
}

/// Handed to the producer closure; the only way it can yield control back
/// to the consumer.
pub struct GeneratorControl {
    to_consumer: SyncSender<FromProducer>,
    from_consumer: Receiver<ToProducer>,
}

impl GeneratorControl {
    pub fn yield_value(&self, key: Option<Value>, value: Value) -> Resumption {
        let sent = self.to_consumer.send(FromProducer::Yielded {
            key: key.map(SendBox),
            value: SendBox(value),
        });
        if sent.is_err() {
            return Resumption::Cancelled;
        }
        match self.from_consumer.recv() {
            Ok(ToProducer::Next(SendBox(v))) => Resumption::Value(v),
            Ok(ToProducer::Throw(SendBox(v))) => Resumption::Thrown(v),
            Ok(ToProducer::Cancel) | Err(RecvError) => Resumption::Cancelled,
        }
    }
}

/// A producer body: receives its bound arguments (transported across the
/// thread boundary via `SendBox` inside [`Generator::spawn`], so the body
/// itself only ever touches `Value`s it constructs on its own thread) and a
/// control handle, and returns its `return` value or an uncaught exception.
pub type ProducerBody = Box<dyn FnOnce(Vec<Value>, &GeneratorControl) -> Result<Value, Value> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenState {
    Created,
    Suspended,
    Finished,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Cannot rewind a generator that was already run")]
    CannotRewind,
    #[error("Cannot traverse an already closed generator")]
    SendOnFinished,
    #[error("Cannot get return value of a generator that hasn't returned")]
    ReturnBeforeFinished,
}

/// The FSM of spec.md §3.8/§4.E bound to a live rendezvous channel pair.
pub struct Generator {
    to_producer: SyncSender<ToProducer>,
    from_producer: Receiver<FromProducer>,
    handle: Option<JoinHandle<()>>,
    state: GenState,
    started: bool,
    advanced_past_first: bool,
    current_key: Option<Value>,
    current_value: Option<Value>,
    auto_key: i64,
    return_value: Option<Value>,
    thrown: Option<Value>,
}

impl Generator {
    /// Create the generator. Per spec.md §4.E, the body does NOT run yet —
    /// the spawned thread blocks on its first recv before calling `body`.
    pub fn spawn(args: Vec<Value>, body: ProducerBody) -> Generator {
        let (to_producer, producer_rx) = sync_channel::<ToProducer>(0);
        let (producer_tx, from_producer) = sync_channel::<FromProducer>(0);
        let boxed_args = SendBox(args);

        let handle = std::thread::spawn(move || {
            let SendBox(args) = boxed_args;
            // Block until the consumer's first rewind/current/valid/next
            // actually asks this body to run at all.
            match producer_rx.recv() {
                Ok(ToProducer::Next(_)) => {}
                Ok(ToProducer::Throw(SendBox(v))) => {
                    let _ = producer_tx.send(FromProducer::Threw(SendBox(v)));
                    return;
                }
                Ok(ToProducer::Cancel) | Err(RecvError) => {
                    let _ = producer_tx.send(FromProducer::Cancelled);
                    return;
                }
            }
            let control = GeneratorControl {
                to_consumer: producer_tx.clone(),
                from_consumer: producer_rx,
            };
            match body(args, &control) {
                Ok(v) => {
                    let _ = producer_tx.send(FromProducer::Returned(SendBox(v)));
                }
                Err(e) => {
                    let _ = producer_tx.send(FromProducer::Threw(SendBox(e)));
                }
            }
        });

        Generator {
            to_producer,
            from_producer,
            handle: Some(handle),
            state: GenState::Created,
            started: false,
            advanced_past_first: false,
            current_key: None,
            current_value: None,
            auto_key: 0,
            return_value: None,
            thrown: None,
        }
    }

    /// One full resume step: send `msg`, block for the producer's reply,
    /// and update cached state. This is the only place that talks to the
    /// channel after creation.
    fn step(&mut self, msg: ToProducer) {
        self.started = true;
        if self.to_producer.send(msg).is_err() {
            self.state = GenState::Finished;
            return;
        }
        match self.from_producer.recv() {
            Ok(FromProducer::Yielded { key, value: SendBox(value) }) => {
                let key = match key {
                    Some(SendBox(Value::Int(i))) if i >= self.auto_key => {
                        self.auto_key = i.saturating_add(1);
                        Value::Int(i)
                    }
                    Some(SendBox(k)) => k,
                    None => {
                        let k = Value::Int(self.auto_key);
                        self.auto_key += 1;
                        k
                    }
                };
                self.current_key = Some(key);
                self.current_value = Some(value);
                self.state = GenState::Suspended;
            }
            Ok(FromProducer::Returned(SendBox(v))) => {
                self.return_value = Some(v);
                self.current_key = None;
                self.current_value = None;
                self.state = GenState::Finished;
            }
            Ok(FromProducer::Threw(SendBox(v))) => {
                self.thrown = Some(v);
                self.current_key = None;
                self.current_value = None;
                self.state = GenState::Finished;
            }
            Ok(FromProducer::Cancelled) | Err(RecvError) => {
                self.current_key = None;
                self.current_value = None;
                self.state = GenState::Finished;
            }
        }
    }

    fn ensure_started(&mut self) {
        if !self.started {
            self.step(ToProducer::Next(SendBox(Value::Null)));
        }
    }

    pub fn rewind(&mut self) -> Result<(), GeneratorError> {
        if self.advanced_past_first {
            return Err(GeneratorError::CannotRewind);
        }
        self.ensure_started();
        Ok(())
    }

    pub fn valid(&mut self) -> bool {
        self.ensure_started();
        self.state == GenState::Suspended
    }

    pub fn current(&mut self) -> Value {
        self.ensure_started();
        self.current_value.clone().unwrap_or(Value::Null)
    }

    pub fn key(&mut self) -> Value {
        self.ensure_started();
        self.current_key.clone().unwrap_or(Value::Null)
    }

    pub fn next(&mut self) {
        if self.state == GenState::Finished {
            return;
        }
        if !self.started {
            // The implicit rewind that every first advance performs.
            self.step(ToProducer::Next(SendBox(Value::Null)));
        }
        if self.state != GenState::Finished {
            self.step(ToProducer::Next(SendBox(Value::Null)));
        }
        self.advanced_past_first = true;
    }

    pub fn send(&mut self, value: Value) -> Result<Value, GeneratorError> {
        if self.state == GenState::Finished {
            return Err(GeneratorError::SendOnFinished);
        }
        if !self.started {
            // Per the reference language: sending to a never-advanced
            // generator is equivalent to next() — the value is discarded.
            self.step(ToProducer::Next(SendBox(Value::Null)));
        } else {
            self.step(ToProducer::Next(SendBox(value)));
        }
        self.advanced_past_first = true;
        Ok(self.current_value.clone().unwrap_or(Value::Null))
    }

    pub fn throw(&mut self, exception: Value) -> Result<Value, GeneratorError> {
        if self.state == GenState::Finished {
            return Err(GeneratorError::SendOnFinished);
        }
        if !self.started {
            self.step(ToProducer::Throw(SendBox(exception)));
        } else {
            self.step(ToProducer::Throw(SendBox(exception)));
        }
        self.advanced_past_first = true;
        Ok(self.current_value.clone().unwrap_or(Value::Null))
    }

    pub fn get_return(&self) -> Result<Value, GeneratorError> {
        if self.state != GenState::Finished {
            return Err(GeneratorError::ReturnBeforeFinished);
        }
        Ok(self.return_value.clone().unwrap_or(Value::Null))
    }

    /// The uncaught-exception slot, if the producer's last step threw.
    pub fn take_thrown(&mut self) -> Option<Value> {
        self.thrown.take()
    }
}

impl Drop for Generator {
    fn drop(&mut self) {
        if self.state != GenState::Finished {
            // Wake a blocked producer so it can unwind instead of leaking a thread.
            let _ = self.to_producer.send(ToProducer::Cancel);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
