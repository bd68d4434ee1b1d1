//! Where collaborator calls run.
//!
//! The shell hands every map-load, autocomplete, geocode and geolocation
//! call to [`spawn`]. On desktop that is the ambient Tokio runtime; in the
//! browser it is the page's microtask queue. Tasks are fire-and-forget: they
//! report back through the app's event channel and are never cancelled.

use crate::prelude::{Future, Pin};

/// A spawned collaborator call. Browser futures hold JS handles and are not
/// `Send`, so the bound only applies off wasm.
#[cfg(not(target_arch = "wasm32"))]
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
#[cfg(target_arch = "wasm32")]
pub type Task = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Runs tasks to completion somewhere off the UI's call stack
pub trait TaskSpawner: Send + Sync + 'static {
    /// `label` names the call in logs
    fn spawn_task(&self, label: &'static str, task: Task);
}

/// `Send` off wasm, nothing in the browser
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// Spawn on the global spawner
pub fn spawn<F>(label: &'static str, future: F)
where
    F: Future<Output = ()> + MaybeSend + 'static,
{
    spawner().spawn_task(label, Box::pin(future));
}

pub mod spawners {
    use super::*;

    /// Spawns onto whichever Tokio runtime is current at the call site
    #[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
    #[derive(Debug, Default, Clone, Copy)]
    pub struct TokioSpawner;

    #[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
    impl TaskSpawner for TokioSpawner {
        fn spawn_task(&self, label: &'static str, task: Task) {
            match ::tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    log::debug!("spawning {label}");
                    // Detached; completion is reported through the event channel
                    drop(handle.spawn(task));
                }
                Err(e) => log::error!("no Tokio runtime for {label}; dropping it: {e}"),
            }
        }
    }

    #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WasmSpawner;

    #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
    impl TaskSpawner for WasmSpawner {
        fn spawn_task(&self, label: &'static str, task: Task) {
            log::debug!("spawning {label}");
            wasm_bindgen_futures::spawn_local(task);
        }
    }
}

static SPAWNER: std::sync::OnceLock<Box<dyn TaskSpawner>> = std::sync::OnceLock::new();

/// Installs a spawner. Only the first call takes effect.
pub fn init_spawner(spawner: Box<dyn TaskSpawner>) {
    if SPAWNER.set(spawner).is_err() {
        log::debug!("spawner already installed; keeping the existing one");
    }
}

/// The global spawner, defaulting by feature
pub fn spawner() -> &'static dyn TaskSpawner {
    SPAWNER
        .get_or_init(|| {
            #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
            {
                Box::new(spawners::WasmSpawner)
            }

            #[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
            {
                Box::new(spawners::TokioSpawner)
            }

            #[cfg(not(any(
                all(feature = "wasm", target_arch = "wasm32"),
                all(feature = "tokio-runtime", not(target_arch = "wasm32"))
            )))]
            {
                panic!("No async runtime available. Enable 'tokio-runtime' or 'wasm' feature.");
            }
        })
        .as_ref()
}
