use std::sync::{Arc, Mutex};

type Listener = Box<dyn Fn() + Send + Sync>;

/// Logout broadcast shared by the API client and every store.
///
/// The API client emits when the backend rejects the session (401 or a
/// deleted user); stores subscribe once and reset their own auth-derived state.
#[derive(Clone, Default)]
pub(crate) struct SessionEvents {
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_logout(&self, f: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(f));
        }
    }

    pub fn emit_logout(&self) {
        tracing::info!("session invalidated, broadcasting logout");
        // Listeners run outside the lock so they may subscribe or emit again.
        let listeners = match self.listeners.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for listener in &listeners {
            listener();
        }
        if let Ok(mut guard) = self.listeners.lock() {
            let added = std::mem::take(&mut *guard);
            *guard = listeners;
            guard.extend(added);
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_every_subscriber() {
        let bus = SessionEvents::new();
        let a = Arc::new(AtomicBool::new(true));
        let b = Arc::new(AtomicBool::new(true));

        let a2 = a.clone();
        bus.on_logout(move || a2.store(false, Ordering::SeqCst));
        let b2 = b.clone();
        bus.on_logout(move || b2.store(false, Ordering::SeqCst));

        bus.emit_logout();
        assert!(!a.load(Ordering::SeqCst));
        assert!(!b.load(Ordering::SeqCst));
    }

    #[test]
    fn test_listeners_survive_emit() {
        let bus = SessionEvents::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        bus.on_logout(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit_logout();
        bus.emit_logout();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_subscribe_during_emit_is_kept() {
        let bus = SessionEvents::new();
        let inner = bus.clone();
        bus.on_logout(move || {
            if inner.listener_count() == 0 {
                inner.on_logout(|| {});
            }
        });

        bus.emit_logout();
        assert_eq!(bus.listener_count(), 2);
    }
}
