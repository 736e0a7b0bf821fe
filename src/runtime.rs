//! Runtime abstraction layer for async operations
//!
//! The viewer is event-driven: the feature fetch and the panel close timer
//! are the only work that outlives the call that started it. Both go
//! through the [`AsyncSpawner`] installed here so an embedding host can
//! supply its own event loop.

use futures::future::BoxFuture;
use std::time::Duration;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it. `None` when there is no
    /// event loop to run it on; the future is dropped.
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Option<Box<dyn AsyncHandle>>;

    /// Timer future completing after `duration`, driven by this spawner's
    /// event loop. Must not need that loop until first polled.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Spawns `future` on the installed runtime
pub fn spawn<F>(future: F) -> Option<Box<dyn AsyncHandle>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(future))
}

/// Runs `task` once `delay` has elapsed, unless the returned handle is
/// cancelled first. `None` when the task could not be scheduled.
pub fn spawn_after<F>(delay: Duration, task: F) -> Option<Box<dyn AsyncHandle>>
where
    F: FnOnce() + Send + 'static,
{
    spawn_after_on(runtime(), delay, task)
}

/// [`spawn_after`] on an explicit spawner
pub fn spawn_after_on<F>(
    spawner: &dyn AsyncSpawner,
    delay: Duration,
    task: F,
) -> Option<Box<dyn AsyncHandle>>
where
    F: FnOnce() + Send + 'static,
{
    let timer = spawner.sleep(delay);
    spawner.spawn_boxed(Box::pin(async move {
        timer.await;
        task();
    }))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use futures::{
        channel::oneshot,
        future::{abortable, AbortHandle},
    };
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };
    use tokio::task::JoinHandle;

    /// Tokio-based async spawner
    pub struct TokioSpawner;

    impl AsyncSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Option<Box<dyn AsyncHandle>> {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => Some(Box::new(TokioHandle(handle.spawn(future)))),
                Err(e) => {
                    log::error!("no tokio runtime to spawn task on: {}", e);
                    None
                }
            }
        }

        fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
            // tokio's timer registers with the reactor on creation
            Box::pin(async move { tokio::time::sleep(duration).await })
        }
    }

    struct TokioHandle(JoinHandle<()>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.is_finished()
        }

        fn cancel(&self) {
            self.0.abort();
        }
    }

    /// Runs each task to completion on its own OS thread. For hosts without
    /// an async event loop.
    pub struct ThreadSpawner;

    impl AsyncSpawner for ThreadSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Option<Box<dyn AsyncHandle>> {
            let (future, abort) = abortable(future);
            let finished = Arc::new(AtomicBool::new(false));
            let done = finished.clone();
            let spawned = std::thread::Builder::new()
                .name("geomap-task".to_string())
                .spawn(move || {
                    let _ = futures::executor::block_on(future);
                    done.store(true, Ordering::SeqCst);
                });
            match spawned {
                Ok(_) => Some(Box::new(ThreadHandle { abort, finished })),
                Err(e) => {
                    log::error!("failed to start task thread: {}", e);
                    None
                }
            }
        }

        fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
            let (tx, rx) = oneshot::channel::<()>();
            let timer = std::thread::Builder::new()
                .name("geomap-timer".to_string())
                .spawn(move || {
                    std::thread::sleep(duration);
                    let _ = tx.send(());
                });
            if let Err(e) = timer {
                // The sender is gone with the closure, so the timer fires at once
                log::error!("failed to start timer thread: {}", e);
            }
            Box::pin(async move {
                let _ = rx.await;
            })
        }
    }

    struct ThreadHandle {
        abort: AbortHandle,
        finished: Arc<AtomicBool>,
    }

    impl AsyncHandle for ThreadHandle {
        fn is_finished(&self) -> bool {
            self.finished.load(Ordering::SeqCst)
        }

        fn cancel(&self) {
            self.abort.abort();
        }
    }
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Initialize the runtime with a specific spawner. Only the first call
/// takes effect.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) {
    if RUNTIME.set(spawner).is_err() {
        log::debug!("runtime already initialised, keeping the existing spawner");
    }
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| Box::new(spawners::TokioSpawner))
        .as_ref()
}
