use crate::status::{Code, RpcError};
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Why a call's cancellation signal fired.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CancelCause {
    /// The client went away or aborted the call.
    Canceled,

    /// The call's deadline lapsed.
    DeadlineExceeded,
}

impl CancelCause {
    pub fn code(self) -> Code {
        match self {
            CancelCause::Canceled => Code::Canceled,
            CancelCause::DeadlineExceeded => Code::DeadlineExceeded,
        }
    }

    pub fn into_error(self) -> RpcError {
        match self {
            CancelCause::Canceled => RpcError::canceled(),
            CancelCause::DeadlineExceeded => RpcError::deadline_exceeded(),
        }
    }
}

/// Controls whether handlers can tell a lapsed deadline apart from a client
/// abort.
///
/// Both always travel over the same signal. With `Unified` the handler only
/// learns that the signal fired; with `Distinguished` it can also read the
/// [`CancelCause`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CancellationMode {
    #[default]
    Unified,
    Distinguished,
}

type CancelCallback = Box<dyn FnOnce() + Send>;

struct SignalState {
    cause: OnceLock<CancelCause>,
    trigger: Mutex<Option<oneshot::Sender<()>>>,
    fired: Shared<oneshot::Receiver<()>>,
    /// `None` once the signal fired or the call finished.
    callbacks: Mutex<Option<Vec<CancelCallback>>>,
}

/// A one-shot, monotonic cancellation flag shared by a call's handler and
/// its driver.
///
/// Handlers can only observe the signal: poll [`is_cancelled`], await
/// [`cancelled`], or register cleanup with [`on_cancel`]. Firing is reserved
/// to the [`CallController`](crate::CallController).
///
/// [`is_cancelled`]: CancellationSignal::is_cancelled
/// [`cancelled`]: CancellationSignal::cancelled
/// [`on_cancel`]: CancellationSignal::on_cancel
#[derive(Clone)]
pub struct CancellationSignal {
    state: Arc<SignalState>,
}

impl CancellationSignal {
    pub(crate) fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            state: Arc::new(SignalState {
                cause: OnceLock::new(),
                trigger: Mutex::new(Some(tx)),
                fired: rx.shared(),
                callbacks: Mutex::new(Some(Vec::new())),
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cause.get().is_some()
    }

    /// Resolves once the signal has fired; immediately if it already has.
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        // The state (and with it the trigger) stays alive as long as the
        // returned future, so the receiver only resolves on a real fire.
        let state = self.state.clone();
        let fired = state.fired.clone();
        async move {
            let _ = fired.await;
            drop(state);
        }
    }

    /// Registers `callback` to run when the signal fires.
    ///
    /// Runs `callback` right away if the signal has already fired. Each
    /// callback runs at most once. Callbacks registered after the call
    /// finished without being cancelled never run.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut callbacks = self.lock_callbacks();

        if self.is_cancelled() {
            drop(callbacks);
            run_callback(Box::new(callback));
        } else if let Some(pending) = callbacks.as_mut() {
            pending.push(Box::new(callback));
        }
    }

    /// Drops pending callbacks once the call can no longer be cancelled.
    ///
    /// Callbacks often capture the call's own context, so keeping them past
    /// the end of the call would keep the context alive forever.
    pub(crate) fn release(&self) {
        self.lock_callbacks().take();
    }

    fn lock_callbacks(&self) -> MutexGuard<'_, Option<Vec<CancelCallback>>> {
        self.state
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn cause(&self) -> Option<CancelCause> {
        self.state.cause.get().copied()
    }

    /// Fires the signal. Returns `false` if it had already fired.
    pub(crate) fn fire(&self, cause: CancelCause) -> bool {
        if self.state.cause.set(cause).is_err() {
            return false;
        }

        if let Some(tx) = self
            .state
            .trigger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            let _ = tx.send(());
        }

        let callbacks = self.lock_callbacks().take().unwrap_or_default();
        for callback in callbacks {
            run_callback(callback);
        }

        true
    }
}

/// Runs a cancellation callback. A panicking callback is logged and does not
/// stop the caller or the callbacks after it.
fn run_callback(callback: CancelCallback) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|reason| reason.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        tracing::error!("Cancellation callback panicked: {}", reason);
    }
}

impl fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
