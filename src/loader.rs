//! Lazily instantiated, memoized backends.
//!
//! A [`Loader`] runs its factory at most once per successful load. Callers
//! arriving while a load is in flight block on the same attempt and receive
//! its outcome. A failed load is replayed to later callers as
//! [`LoadError::CoolingDown`] until the cooldown elapses, after which the next
//! caller retries.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::LoadError;

type Factory<T> = Arc<dyn Fn() -> Result<T, String> + Send + Sync>;

enum LoadState<T> {
    Idle,
    Loading,
    Ready(Arc<T>),
    Failed { error: LoadError, at: Instant },
}

pub struct Loader<T: Send + Sync + 'static> {
    backend: &'static str,
    factory: Factory<T>,
    timeout: Duration,
    cooldown: Duration,
    state: Mutex<LoadState<T>>,
    settled: Condvar,
}

impl<T: Send + Sync + 'static> Loader<T> {
    pub fn new<F>(backend: &'static str, timeout: Duration, cooldown: Duration, factory: F) -> Self
    where
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            backend,
            factory: Arc::new(factory),
            timeout,
            cooldown,
            state: Mutex::new(LoadState::Idle),
            settled: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoadState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Result<Arc<T>, LoadError> {
        let mut state = self.lock();
        let mut waited = false;
        loop {
            match &*state {
                LoadState::Ready(value) => return Ok(value.clone()),
                LoadState::Failed { error, .. } if waited => return Err(error.clone()),
                LoadState::Failed { error, at } => {
                    let elapsed = at.elapsed();
                    if elapsed < self.cooldown {
                        tracing::debug!(backend = self.backend, "load failed recently, failing fast");
                        return Err(LoadError::CoolingDown {
                            backend: self.backend,
                            remaining: self.cooldown - elapsed,
                            cause: Box::new(error.clone()),
                        });
                    }
                    break;
                }
                LoadState::Loading => {
                    waited = true;
                    state = self
                        .settled
                        .wait(state)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                }
                LoadState::Idle => break,
            }
        }
        *state = LoadState::Loading;
        drop(state);

        tracing::debug!(backend = self.backend, "loading backend");
        let outcome = self.run_factory();

        let mut state = self.lock();
        let result = match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                *state = LoadState::Ready(value.clone());
                tracing::debug!(backend = self.backend, "backend ready");
                Ok(value)
            }
            Err(error) => {
                tracing::warn!(backend = self.backend, %error, "backend failed to load");
                *state = LoadState::Failed {
                    error: error.clone(),
                    at: Instant::now(),
                };
                Err(error)
            }
        };
        self.settled.notify_all();
        result
    }

    fn run_factory(&self) -> Result<T, LoadError> {
        let (tx, rx) = mpsc::channel();
        let factory = self.factory.clone();
        let spawned = thread::Builder::new()
            .name(format!("{}-loader", self.backend))
            .spawn(move || {
                let _ = tx.send(factory());
            });
        if let Err(e) = spawned {
            return Err(LoadError::Failed {
                backend: self.backend,
                message: e.to_string(),
            });
        }
        match rx.recv_timeout(self.timeout) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(LoadError::Failed {
                backend: self.backend,
                message,
            }),
            Err(RecvTimeoutError::Timeout) => Err(LoadError::Timeout {
                backend: self.backend,
                timeout: self.timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(LoadError::Failed {
                backend: self.backend,
                message: "loader thread exited without a result".to_string(),
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.lock(), LoadState::Ready(_))
    }

    /// Forget any loaded value or cached failure.
    pub fn reset(&self) {
        *self.lock() = LoadState::Idle;
        self.settled.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_loader(
        calls: Arc<AtomicUsize>,
        fail: bool,
        cooldown: Duration,
    ) -> Loader<String> {
        Loader::new("test", Duration::from_secs(5), cooldown, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err("boom".to_string())
            } else {
                Ok("parser".to_string())
            }
        })
    }

    #[test]
    fn memoizes_successful_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), false, Duration::ZERO);
        assert_eq!(*loader.get().unwrap(), "parser");
        assert_eq!(*loader.get().unwrap(), "parser");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(loader.is_ready());
    }

    #[test]
    fn failure_is_replayed_during_cooldown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), true, Duration::from_secs(60));
        let first = loader.get().unwrap_err();
        assert!(matches!(first, LoadError::Failed { ref message, .. } if message == "boom"));
        let second = loader.get().unwrap_err();
        match second {
            LoadError::CoolingDown { cause, .. } => assert_eq!(*cause, first),
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retries_once_cooldown_elapsed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), true, Duration::ZERO);
        assert!(loader.get().is_err());
        assert!(loader.get().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_clears_cached_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), true, Duration::from_secs(60));
        assert!(loader.get().is_err());
        loader.reset();
        assert!(matches!(loader.get(), Err(LoadError::Failed { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn slow_factory_times_out() {
        let loader: Loader<u8> = Loader::new(
            "slow",
            Duration::from_millis(20),
            Duration::from_secs(60),
            || {
                thread::sleep(Duration::from_millis(500));
                Ok(1)
            },
        );
        assert!(matches!(loader.get(), Err(LoadError::Timeout { backend: "slow", .. })));
        assert!(matches!(loader.get(), Err(LoadError::CoolingDown { .. })));
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = Arc::new(Loader::new(
            "shared",
            Duration::from_secs(5),
            Duration::ZERO,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
                Ok(7u32)
            },
        ));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = loader.clone();
                thread::spawn(move || *loader.get().unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
