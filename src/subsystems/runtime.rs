//! Generic component runtime — shared scaffolding for long-running channels.
//!
//! A [`Component`] is an independently-runnable unit (a chat channel today)
//! that captures its shared state at construction time. [`spawn_components`]
//! runs a set of them concurrently and returns a [`SubsystemHandle`] that
//! resolves when all of them have exited. Any component error cancels the
//! shared [`CancellationToken`] so siblings shut down too.

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::AppError;

// ── Component ─────────────────────────────────────────────────────────────────

/// A boxed, owned future returned by [`Component::run`].
pub type ComponentFuture =
    Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A self-contained, concurrently-runnable unit.
///
/// [`Component::run`] is called once and should run until `shutdown` is
/// cancelled or the component's own work is done.
pub trait Component: Send + 'static {
    /// Stable identifier used in log messages.
    fn id(&self) -> &str;

    /// Consume the component and return its run-loop as a boxed future.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture;
}

// ── SubsystemHandle ───────────────────────────────────────────────────────────

/// Handle to a running set of components. `.await` it via [`join`](Self::join).
pub struct SubsystemHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl SubsystemHandle {
    /// Await all components and return the first error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("subsystem task panicked: {e}"))),
        }
    }
}

// ── spawn_components ──────────────────────────────────────────────────────────

/// Spawn each [`Component`] as its own Tokio task.
///
/// If any component returns `Err` or panics, `shutdown` is cancelled and the
/// first error is reported once the remaining components have drained.
pub fn spawn_components(
    components: Vec<Box<dyn Component>>,
    shutdown: CancellationToken,
) -> SubsystemHandle {
    let handle = tokio::spawn(async move {
        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();

        for component in components {
            debug!(component = %component.id(), "spawning component");
            set.spawn(component.run(shutdown.clone()));
        }

        let mut first_err: Option<AppError> = None;

        while let Some(res) = set.join_next().await {
            match res {
                Err(e) => {
                    error!("component panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| {
                        AppError::Comms(format!("component panicked: {e}"))
                    });
                }
                Ok(Err(e)) => {
                    error!("component error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                Ok(Ok(())) => {}
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    });

    SubsystemHandle { inner: handle }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Waits for shutdown, or fails immediately when `fail` is set.
    struct Probe {
        id: &'static str,
        fail: bool,
    }

    impl Component for Probe {
        fn id(&self) -> &str {
            self.id
        }

        fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
            Box::pin(async move {
                if self.fail {
                    return Err(AppError::Comms(format!("{} failed", self.id)));
                }
                shutdown.cancelled().await;
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn empty_set_resolves_ok() {
        spawn_components(Vec::new(), CancellationToken::new()).join().await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_stops_components() {
        let token = CancellationToken::new();
        let handle = spawn_components(
            vec![Box::new(Probe { id: "a", fail: false })],
            token.clone(),
        );
        token.cancel();
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn error_cancels_siblings_and_is_reported() {
        let token = CancellationToken::new();
        let handle = spawn_components(
            vec![
                Box::new(Probe { id: "waiter", fail: false }),
                Box::new(Probe { id: "broken", fail: true }),
            ],
            token.clone(),
        );
        let err = handle.join().await.unwrap_err();
        assert!(err.to_string().contains("broken failed"));
        assert!(token.is_cancelled());
    }
}
