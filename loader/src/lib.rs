//! Instantiate a signing engine exactly once and share the outcome with every caller.
//!
//! # Overview
//!
//! A [Loader] is constructed once with a factory that asynchronously produces an
//! [Engine]. The first call to [Loader::load] takes the factory and wraps it in a shared
//! future. That call and every later call (before or after completion) return a clone of the same
//! [Handle], so the factory runs at most once and every awaiter observes the identical outcome.
//!
//! A failed load is terminal. The failure is recorded in [LoadState] and returned to every
//! awaiter, and the factory is never invoked again. Loads cannot be cancelled and there is no
//! timeout.
//!
//! The load starts when [Loader::load] is first called. It is driven to completion on a dedicated
//! thread, so [Loader::engine_if_loaded] eventually returns the engine even if no [Handle] is ever
//! awaited. Where threads are unavailable, the load makes progress whenever any clone of its
//! [Handle] (or a [Signal] derived from it) is polled. [Loader::state] and
//! [Loader::engine_if_loaded] never block. A factory that panics is reported as a failed load.
//!
//! # Example
//! ```rust
//! use futures::executor::block_on;
//! use starksig_cryptography::Stark;
//! use starksig_loader::{Config, Loader};
//! use std::sync::Arc;
//!
//! let loader = Loader::new(
//!     Config { name: "stark".into() },
//!     || async { Ok(Stark) },
//! );
//!
//! let engine = block_on(loader.load()).unwrap();
//! assert!(loader.engine_if_loaded().is_some());
//! assert!(!loader.state().failed_to_load);
//!
//! let mut signer = loader.signer().unwrap();
//! assert!(Arc::ptr_eq(signer.engine(), &engine));
//!
//! let mut secret = [0u8; 32];
//! secret[0] = 5;
//! signer.load_secret_key(&secret).unwrap();
//! ```

use futures::{
    executor::block_on,
    future::{BoxFuture, Shared},
    FutureExt,
};
use starksig_cryptography::{Engine, Signer};
use std::{
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::{Arc, Mutex, Weak},
    task::{Context, Poll},
    thread,
};
use tracing::{debug, error, info, warn};

mod error;
pub use error::Error;
mod signal;
pub use signal::Signal;

type Factory<E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<E, Error>> + Send>;

/// Configuration for a [Loader].
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the engine being loaded, attached to every log emitted by the [Loader].
    pub name: String,
}

/// Snapshot of a [Loader]'s progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadState {
    /// True from the first call to [Loader::load] until the load completes.
    pub is_loading: bool,
    /// True once the load has failed. Never reset.
    pub failed_to_load: bool,
}

/// A cloneable future resolving to the outcome of a load.
pub struct Handle<E: Engine> {
    inner: Shared<BoxFuture<'static, Result<Arc<E>, Error>>>,
}

impl<E: Engine> Clone for Handle<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Engine> Handle<E> {
    /// Returns a [Signal] that resolves when the load completes, whatever the outcome.
    pub fn signal(&self) -> Signal {
        if self.inner.peek().is_some() {
            return Signal::Closed;
        }
        Signal::Open(self.inner.clone().map(|_| ()).boxed().shared())
    }
}

impl<E: Engine> Future for Handle<E> {
    type Output = Result<Arc<E>, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

struct Inner<E: Engine> {
    state: LoadState,
    factory: Option<Factory<E>>,
    handle: Option<Handle<E>>,
    engine: Option<Arc<E>>,
}

/// Loads an [Engine] exactly once.
pub struct Loader<E: Engine> {
    cfg: Config,
    inner: Arc<Mutex<Inner<E>>>,
}

impl<E: Engine> Loader<E> {
    /// Creates a [Loader] that will produce its engine with `factory`.
    ///
    /// Nothing is loaded until [Loader::load] is called.
    pub fn new<F, Fut>(cfg: Config, factory: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<E, Error>> + Send + 'static,
    {
        let factory: Factory<E> = Box::new(move || factory().boxed());
        Self {
            cfg,
            inner: Arc::new(Mutex::new(Inner {
                state: LoadState::default(),
                factory: Some(factory),
                handle: None,
                engine: None,
            })),
        }
    }

    /// Returns the [Handle] of the load, starting it on the first call.
    ///
    /// The factory is invoked by the load itself, never while the [Loader]'s state is locked.
    pub fn load(&self) -> Handle<E> {
        let handle = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(handle) = &inner.handle {
                return handle.clone();
            }

            // The handle is only ever unset while the factory is unused.
            let factory = inner
                .factory
                .take()
                .expect("factory is only taken when the handle is set");
            inner.state.is_loading = true;

            let name = self.cfg.name.clone();
            let shared = Arc::downgrade(&self.inner);
            let handle = Handle {
                inner: complete(name, shared, factory).boxed().shared(),
            };
            inner.handle = Some(handle.clone());
            handle
        };
        self.drive(&handle);
        handle
    }

    /// Drives the load to completion on a dedicated thread.
    fn drive(&self, handle: &Handle<E>) {
        let signal = handle.signal();
        let name = self.cfg.name.clone();
        let spawned = thread::Builder::new()
            .name(format!("{name}-loader"))
            .spawn(move || block_on(signal));
        match spawned {
            Ok(_) => debug!(engine = %name, "started load"),
            Err(err) => warn!(engine = %name, ?err, "load will only progress when polled"),
        }
    }

    /// Returns a snapshot of the load's progress.
    pub fn state(&self) -> LoadState {
        self.inner.lock().unwrap().state
    }

    /// Returns the engine if it has been loaded successfully.
    pub fn engine_if_loaded(&self) -> Option<Arc<E>> {
        self.inner.lock().unwrap().engine.clone()
    }

    /// Returns a [Signer] over the engine if it has been loaded successfully.
    pub fn signer(&self) -> Option<Signer<E>> {
        self.engine_if_loaded().map(Signer::new)
    }
}

/// Runs the factory and records its outcome.
async fn complete<E: Engine>(
    name: String,
    shared: Weak<Mutex<Inner<E>>>,
    factory: Factory<E>,
) -> Result<Arc<E>, Error> {
    let result = match AssertUnwindSafe(async move { factory().await })
        .catch_unwind()
        .await
    {
        Ok(result) => result.map(Arc::new),
        Err(_) => Err(Error::Failed("factory panicked".into())),
    };

    // The loader may have been dropped while a handle was still pending.
    if let Some(shared) = shared.upgrade() {
        let mut inner = shared.lock().unwrap();
        inner.state.is_loading = false;
        match &result {
            Ok(engine) => inner.engine = Some(engine.clone()),
            Err(_) => inner.state.failed_to_load = true,
        }
    }
    match &result {
        Ok(_) => info!(engine = %name, "loaded engine"),
        Err(err) => error!(engine = %name, ?err, "failed to load engine"),
    }
    result
}
