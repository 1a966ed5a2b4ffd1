//! Single-slot cancellable suspension primitive.
//!
//! Every pause a script makes (text, choice, custom action) is a wait on a
//! gate. A gate holds at most one pending waiter: a new `wait()` cancels the
//! previous waiter instead of queueing behind it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use talespin_core::interrupt::{Interrupt, ScriptResult};
use talespin_core::sync::lock;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Callback run synchronously when a waiter is resolved, before the waiting
/// script is released.
pub type ResolveCallback = Arc<dyn Fn() + Send + Sync>;

struct PendingWaiter<T> {
    id: u64,
    sender: oneshot::Sender<ScriptResult<T>>,
}

struct GateSlot<T> {
    pending: Option<PendingWaiter<T>>,
    next_id: u64,
    skip: bool,
}

/// A single-slot cancellable future source.
///
/// Clones share the same slot.
pub struct SuspensionGate<T> {
    name: &'static str,
    slot: Arc<Mutex<GateSlot<T>>>,
    on_resolve: Option<ResolveCallback>,
    skip_delay: Duration,
}

impl<T> Clone for SuspensionGate<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            slot: Arc::clone(&self.slot),
            on_resolve: self.on_resolve.clone(),
            skip_delay: self.skip_delay,
        }
    }
}

impl<T> fmt::Debug for SuspensionGate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.slot);
        f.debug_struct("SuspensionGate")
            .field("name", &self.name)
            .field("has_waiter", &slot.pending.is_some())
            .field("skip", &slot.skip)
            .finish_non_exhaustive()
    }
}

impl<T: Default + Send + 'static> SuspensionGate<T> {
    /// Creates an idle gate. `skip_delay` paces auto-resolution in skip mode.
    #[must_use]
    pub fn new(name: &'static str, skip_delay: Duration) -> Self {
        Self {
            name,
            slot: Arc::new(Mutex::new(GateSlot {
                pending: None,
                next_id: 0,
                skip: false,
            })),
            on_resolve: None,
            skip_delay,
        }
    }

    /// Sets the callback invoked on every successful resolution.
    #[must_use]
    pub fn with_on_resolve(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_resolve = Some(Arc::new(callback));
        self
    }

    /// Returns the gate's name (used in logs).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Suspends until the gate is resolved or rejected.
    ///
    /// A waiter already pending on this gate is rejected with
    /// [`Interrupt::Navigation`] first. In skip mode the new waiter resolves
    /// with `T::default()` after the pacing delay.
    pub fn wait(&self) -> Waiter<T> {
        let (sender, receiver) = oneshot::channel();
        let (id, skip) = {
            let mut slot = lock(&self.slot);
            if let Some(stale) = slot.pending.take() {
                debug!(gate = self.name, waiter = stale.id, "cancelling stale waiter");
                let _ = stale.sender.send(Err(Interrupt::Navigation));
            }
            slot.next_id += 1;
            let id = slot.next_id;
            slot.pending = Some(PendingWaiter { id, sender });
            (id, slot.skip)
        };

        if skip {
            self.arm_skip_timer(id);
        }

        Waiter { receiver }
    }

    /// Fulfills the pending waiter with `value`.
    ///
    /// The resolve callback runs before the waiter is released. Returns
    /// `false` (and logs a state consistency warning) if nothing was waiting.
    pub fn resolve(&self, value: T) -> bool {
        self.fulfill(None, value)
    }

    /// Fails the pending waiter with [`Interrupt::Navigation`].
    ///
    /// Returns `false` if nothing was waiting.
    pub fn reject(&self) -> bool {
        let pending = lock(&self.slot).pending.take();
        match pending {
            Some(pending) => {
                debug!(gate = self.name, waiter = pending.id, "rejecting waiter");
                let _ = pending.sender.send(Err(Interrupt::Navigation));
                true
            }
            None => false,
        }
    }

    /// Returns `true` if a waiter is pending.
    #[must_use]
    pub fn has_waiter(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }

    /// Turns skip mode on, immediately resolving a pending waiter.
    pub fn enable_skip(&self) {
        let pending = {
            let mut slot = lock(&self.slot);
            slot.skip = true;
            slot.pending.is_some()
        };
        if pending {
            self.fulfill(None, T::default());
        }
    }

    /// Turns skip mode off. Timers already armed still fire.
    pub fn disable_skip(&self) {
        lock(&self.slot).skip = false;
    }

    /// Returns `true` while skip mode is on.
    #[must_use]
    pub fn is_skipping(&self) -> bool {
        lock(&self.slot).skip
    }

    /// Resolves the pending waiter. With `only` set, resolves it only if it is
    /// that exact waiter; a mismatch is silent.
    fn fulfill(&self, only: Option<u64>, value: T) -> bool {
        let pending = {
            let mut slot = lock(&self.slot);
            match (&slot.pending, only) {
                (Some(pending), Some(id)) if pending.id != id => None,
                _ => slot.pending.take(),
            }
        };

        let Some(pending) = pending else {
            if only.is_none() {
                warn!(
                    gate = self.name,
                    "state consistency warning: resolve called with no pending waiter"
                );
            }
            return false;
        };

        if let Some(callback) = &self.on_resolve {
            callback();
        }
        // The waiting script may already have been dropped.
        let _ = pending.sender.send(Ok(value));
        true
    }

    fn arm_skip_timer(&self, id: u64) {
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let gate = self.clone();
            runtime.spawn(async move {
                tokio::time::sleep(gate.skip_delay).await;
                gate.fulfill(Some(id), T::default());
            });
        } else {
            self.fulfill(Some(id), T::default());
        }
    }
}

/// Future returned by [`SuspensionGate::wait`].
#[derive(Debug)]
#[must_use = "a waiter does nothing unless awaited"]
pub struct Waiter<T> {
    receiver: oneshot::Receiver<ScriptResult<T>>,
}

impl<T> Future for Waiter<T> {
    type Output = ScriptResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the gate went away; treat it as cancellation.
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(Interrupt::Navigation)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const SHORT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_second_wait_interrupts_first_and_stays_pending() {
        // Arrange
        let gate: SuspensionGate<u32> = SuspensionGate::new("test", SHORT);
        let first = gate.wait();

        // Act
        let second = gate.wait();

        // Assert
        assert_eq!(first.await, Err(Interrupt::Navigation));
        assert!(gate.has_waiter());
        assert!(gate.resolve(7));
        assert_eq!(second.await, Ok(7));
        assert!(!gate.has_waiter());
    }

    #[tokio::test]
    async fn test_resolve_without_waiter_returns_false() {
        let gate: SuspensionGate<()> = SuspensionGate::new("test", SHORT);

        assert!(!gate.resolve(()));
        assert!(!gate.has_waiter());
    }

    #[tokio::test]
    async fn test_reject_interrupts_waiter_and_clears_slot() {
        // Arrange
        let gate: SuspensionGate<()> = SuspensionGate::new("test", SHORT);
        let waiter = gate.wait();

        // Act
        let rejected = gate.reject();

        // Assert
        assert!(rejected);
        assert_eq!(waiter.await, Err(Interrupt::Navigation));
        assert!(!gate.reject());
    }

    #[tokio::test]
    async fn test_callback_runs_before_waiter_is_released() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let callback_log = Arc::clone(&log);
        let gate: SuspensionGate<()> = SuspensionGate::new("test", SHORT)
            .with_on_resolve(move || callback_log.lock().unwrap().push("callback"));
        let waiter = gate.wait();

        // Act
        gate.resolve(());
        waiter.await.unwrap();
        log.lock().unwrap().push("resumed");

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["callback", "resumed"]);
    }

    #[tokio::test]
    async fn test_callback_not_run_when_nothing_waits() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let gate: SuspensionGate<()> = SuspensionGate::new("test", SHORT)
            .with_on_resolve(move || *counter.lock().unwrap() += 1);

        gate.resolve(());

        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_enable_skip_resolves_pending_waiter_with_default() {
        // Arrange
        let gate: SuspensionGate<String> = SuspensionGate::new("test", SHORT);
        let waiter = gate.wait();

        // Act
        gate.enable_skip();

        // Assert
        assert_eq!(waiter.await, Ok(String::new()));
        assert!(gate.is_skipping());
    }

    #[tokio::test]
    async fn test_wait_in_skip_mode_resolves_after_pacing_delay() {
        // Arrange
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let gate: SuspensionGate<()> = SuspensionGate::new("test", SHORT)
            .with_on_resolve(move || *counter.lock().unwrap() += 1);
        gate.enable_skip();

        // Act
        let result = tokio::time::timeout(Duration::from_millis(500), gate.wait()).await;

        // Assert
        assert_eq!(result, Ok(Ok(())));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stale_skip_timer_does_not_resolve_newer_waiter() {
        // Arrange
        let gate: SuspensionGate<()> = SuspensionGate::new("test", Duration::from_millis(30));
        gate.enable_skip();
        let first = gate.wait();
        gate.disable_skip();
        gate.resolve(());
        first.await.unwrap();

        // Act
        let _second = gate.wait();
        tokio::time::sleep(Duration::from_millis(80)).await;

        // Assert
        assert!(gate.has_waiter());
    }

    #[tokio::test]
    async fn test_dropped_gate_interrupts_waiter() {
        let gate: SuspensionGate<()> = SuspensionGate::new("test", SHORT);
        let waiter = gate.wait();

        drop(gate);

        assert_eq!(waiter.await, Err(Interrupt::Navigation));
    }
}
