//! Debounced callbacks
//!
//! A [`Debouncer`] coalesces a burst of calls into one. Every call cancels
//! the pending timer and starts a new one; when the timer runs out the
//! callback fires with the arguments of the latest call. In immediate mode
//! the first call of a burst fires synchronously instead and no trailing
//! call is made.
//!
//! Timers run on the tokio runtime that was current when the debouncer was
//! created.

use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

#[derive(Default)]
struct Timer {
    generation: u64,
    pending: bool,
    task: Option<JoinHandle<()>>,
}

pub struct Debouncer<A> {
    callback: Callback<A>,
    wait: Duration,
    immediate: bool,
    runtime: Handle,
    timer: Arc<Mutex<Timer>>,
}

fn lock(timer: &Mutex<Timer>) -> MutexGuard<'_, Timer> {
    timer.lock().unwrap_or_else(|e| e.into_inner())
}

impl<A: Send + 'static> Debouncer<A> {
    /// Create a debouncer on the current tokio runtime
    pub fn new<F>(callback: F, wait: Duration, immediate: bool) -> Result<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Other(format!("debouncer needs a tokio runtime: {}", e)))?;
        Ok(Self::with_handle(runtime, callback, wait, immediate))
    }

    /// Create a debouncer whose timers run on `runtime`
    pub fn with_handle<F>(runtime: Handle, callback: F, wait: Duration, immediate: bool) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            wait,
            immediate,
            runtime,
            timer: Arc::new(Mutex::new(Timer::default())),
        }
    }

    pub fn call(&self, args: A) {
        let (generation, fire_now) = {
            let mut timer = lock(&self.timer);
            let fire_now = self.immediate && !timer.pending;
            if let Some(task) = timer.task.take() {
                task.abort();
            }
            timer.generation += 1;
            timer.pending = true;
            (timer.generation, fire_now)
        };

        let trailing = if self.immediate {
            if fire_now {
                (self.callback)(args);
            }
            None
        } else {
            Some(args)
        };

        let state = Arc::clone(&self.timer);
        let callback = Arc::clone(&self.callback);
        let wait = self.wait;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            {
                let mut timer = lock(&state);
                if timer.generation != generation {
                    return;
                }
                timer.pending = false;
                timer.task = None;
            }
            if let Some(args) = trailing {
                callback(args);
            }
        });

        let mut timer = lock(&self.timer);
        if timer.generation == generation && timer.pending {
            timer.task = Some(task);
        }
    }

    /// Drop the pending call, if any
    pub fn cancel(&self) {
        let mut timer = lock(&self.timer);
        if let Some(task) = timer.task.take() {
            task.abort();
        }
        timer.generation += 1;
        timer.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.timer).pending
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.timer).task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn(u32) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move |_: u32| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn new_outside_runtime_is_an_error() {
        let (_count, cb) = counter();
        assert!(Debouncer::new(cb, Duration::from_millis(10), false).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let (count, cb) = counter();
        let d = Debouncer::new(cb, Duration::from_millis(100), false).unwrap();
        d.call(1);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.is_pending());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_clears_after_firing() {
        let (count, cb) = counter();
        let d = Debouncer::new(cb, Duration::from_millis(100), false).unwrap();
        d.call(1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!d.is_pending());
    }
}
