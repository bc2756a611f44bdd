// Host-exit hook registry
//
// Spawned GUI processes must not outlive a crashing or interrupted test
// runner. Instead of relying on process-exit events, cleanup is an explicit
// registry of one-shot hooks: the launcher registers a kill hook per child,
// and the host runs the registry once on its way out (directly or via the
// Ctrl-C installer). Hooks registered after the registry has fired run
// immediately, since the process is already exiting.

use parking_lot::Mutex;
use std::sync::OnceLock;

type Hook = Box<dyn FnOnce() + Send>;

/// Identifies a registered hook so it can be removed once it is no longer
/// needed (e.g. the child exited on its own)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookHandle(u64);

#[derive(Default)]
struct Inner {
    next_id: u64,
    hooks: Vec<(u64, Hook)>,
    fired: bool,
}

/// A registry of one-shot shutdown hooks with deterministic single-fire
/// semantics
#[derive(Default)]
pub struct ShutdownHooks {
    inner: Mutex<Inner>,
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook to run when the registry fires.
    ///
    /// If the registry has already fired, the hook runs immediately on the
    /// calling thread and the returned handle is inert.
    pub fn register(&self, hook: impl FnOnce() + Send + 'static) -> HookHandle {
        let mut inner = self.inner.lock();
        if inner.fired {
            drop(inner);
            hook();
            return HookHandle(0);
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.hooks.push((id, Box::new(hook)));
        HookHandle(id)
    }

    /// Removes a hook; a no-op if it already ran or was removed
    pub fn deregister(&self, handle: HookHandle) {
        let mut inner = self.inner.lock();
        inner.hooks.retain(|(id, _)| *id != handle.0);
    }

    /// Runs every registered hook exactly once. Idempotent.
    pub fn run(&self) {
        let hooks = {
            let mut inner = self.inner.lock();
            inner.fired = true;
            std::mem::take(&mut inner.hooks)
        };
        // Hooks run outside the lock so they may register/deregister.
        for (_, hook) in hooks {
            hook();
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().hooks.len()
    }
}

/// The process-wide registry used by spawned application processes
pub fn global() -> &'static ShutdownHooks {
    static GLOBAL: OnceLock<ShutdownHooks> = OnceLock::new();
    GLOBAL.get_or_init(ShutdownHooks::new)
}

/// Installs a Ctrl-C handler that fires the global registry and exits.
///
/// Optional: hosts that control their own shutdown can call
/// `shutdown::global().run()` themselves instead.
pub fn install_ctrl_c_handler() {
    tokio::spawn(async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            return;
        }
        tracing::debug!("Ctrl-C received, running shutdown hooks");
        global().run();
        std::process::exit(130);
    });
}
