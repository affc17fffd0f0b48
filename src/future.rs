//! Asynchronous results and the `Future` entry points.
//!
//! An engine operation that completes later hands back a [`NativeFuture`];
//! the bridge wraps it in a [`FutureHandle`] like any other native object.
//! The value can be waited for any number of times but retrieved only once.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::time::Duration;

use crate::bridge::{lock, Bridge};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::ffi::{boundary, destructor, Env, FutureHandle, Handle};
use crate::types::{timeout_from_ms, SlaveId};

/// The producing end of a [`NativeFuture`].
pub struct Promise<T> {
    tx: SyncSender<Result<T>>,
}

impl<T> Promise<T> {
    /// Complete the future with a value.
    pub fn set_value(self, value: T) {
        self.set(Ok(value));
    }

    /// Complete the future with an error.
    pub fn set_error(self, err: Error) {
        self.set(Err(err));
    }

    fn set(self, result: Result<T>) {
        // Nobody is listening if the future was destroyed first.
        if self.tx.send(result).is_err() {
            log::debug!("future was dropped before its result arrived");
        }
    }
}

enum State<T> {
    Waiting(Receiver<Result<T>>),
    Ready(Result<T>),
    Broken,
    Retrieved,
}

/// A result that becomes available later.
pub struct NativeFuture<T> {
    state: State<T>,
}

/// Create a connected promise/future pair.
pub fn channel<T>() -> (Promise<T>, NativeFuture<T>) {
    let (tx, rx) = mpsc::sync_channel(1);
    (
        Promise { tx },
        NativeFuture {
            state: State::Waiting(rx),
        },
    )
}

impl<T> NativeFuture<T> {
    /// A future that already holds `value`.
    pub fn ready(value: T) -> Self {
        Self {
            state: State::Ready(Ok(value)),
        }
    }

    /// A future that already holds an error.
    pub fn failed(err: Error) -> Self {
        Self {
            state: State::Ready(Err(err)),
        }
    }

    /// Block until the result is available.
    pub fn wait(&mut self) -> Result<()> {
        if let State::Waiting(rx) = &self.state {
            self.state = match rx.recv() {
                Ok(result) => State::Ready(result),
                Err(_) => State::Broken,
            };
        }
        self.check_valid()
    }

    /// Block for at most `timeout`. Returns whether the result is available.
    pub fn wait_for(&mut self, timeout: Duration) -> Result<bool> {
        if let State::Waiting(rx) = &self.state {
            self.state = match rx.recv_timeout(timeout) {
                Ok(result) => State::Ready(result),
                Err(RecvTimeoutError::Timeout) => return Ok(false),
                Err(RecvTimeoutError::Disconnected) => State::Broken,
            };
        }
        self.check_valid()?;
        Ok(true)
    }

    /// Wait for and take the result. Only the first call gets it.
    pub fn get(&mut self) -> Result<T> {
        self.wait()?;
        match std::mem::replace(&mut self.state, State::Retrieved) {
            State::Ready(result) => result,
            State::Broken => Err(Error::native("broken promise")),
            State::Waiting(_) | State::Retrieved => {
                Err(Error::logic("future value has already been retrieved"))
            }
        }
    }

    fn check_valid(&self) -> Result<()> {
        match self.state {
            State::Retrieved => Err(Error::logic("future value has already been retrieved")),
            _ => Ok(()),
        }
    }
}

/// A future as held by the bridge: one of the result types an entry point
/// can produce.
pub enum FutureVariant {
    Void(NativeFuture<()>),
    SlaveId(NativeFuture<SlaveId>),
}

impl FutureVariant {
    fn wait(&mut self) -> Result<()> {
        match self {
            FutureVariant::Void(f) => f.wait(),
            FutureVariant::SlaveId(f) => f.wait(),
        }
    }

    fn wait_for(&mut self, timeout: Duration) -> Result<bool> {
        match self {
            FutureVariant::Void(f) => f.wait_for(timeout),
            FutureVariant::SlaveId(f) => f.wait_for(timeout),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            FutureVariant::Void(_) => "Future.Void",
            FutureVariant::SlaveId(_) => "Future.SlaveID",
        }
    }
}

/// `no.viproma.coral.master.Future` and its subclasses.
impl<G: Engine> Bridge<G> {
    /// `Future.destroyNative`
    pub fn future_destroy(&self, env: &mut dyn Env, future: i64) {
        let handle = FutureHandle::from_raw(future);
        if !handle.is_valid() {
            return;
        }
        destructor(env, || self.futures.destroy(handle).map(drop));
    }

    /// `Future.waitForResultNative(long)`
    pub fn future_wait(&self, env: &mut dyn Env, future: i64) {
        boundary(env, (), |_| {
            let future = self.futures.get(FutureHandle::from_raw(future))?;
            let mut future = lock(&future);
            future.wait()
        })
    }

    /// `Future.waitForResultNative(long, int)`
    pub fn future_wait_for(&self, env: &mut dyn Env, future: i64, timeout_ms: i32) -> bool {
        boundary(env, false, |_| {
            let timeout = timeout_from_ms(timeout_ms)?;
            let future = self.futures.get(FutureHandle::from_raw(future))?;
            let mut future = lock(&future);
            future.wait_for(timeout)
        })
    }

    /// `Future.Void.getValueNative`
    pub fn future_void_get(&self, env: &mut dyn Env, future: i64) {
        boundary(env, (), |_| {
            let future = self.futures.get(FutureHandle::from_raw(future))?;
            let mut future = lock(&future);
            match &mut *future {
                FutureVariant::Void(f) => f.get(),
                other => Err(wrong_variant(other, "Future.Void")),
            }
        })
    }

    /// `Future.SlaveID.getValueNative`
    pub fn future_slave_id_get(&self, env: &mut dyn Env, future: i64) -> i32 {
        boundary(env, 0, |_| {
            let future = self.futures.get(FutureHandle::from_raw(future))?;
            let mut future = lock(&future);
            match &mut *future {
                FutureVariant::SlaveId(f) => Ok(i32::from(f.get()?.0)),
                other => Err(wrong_variant(other, "Future.SlaveID")),
            }
        })
    }
}

fn wrong_variant(future: &FutureVariant, requested: &str) -> Error {
    Error::logic(format!(
        "value of a {} requested as {}",
        future.kind(),
        requested
    ))
}
