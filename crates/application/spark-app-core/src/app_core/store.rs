use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::AppState;

use super::{events::DomainEvent, reducer::reduce};

/// Single writer over the whole application state.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<Mutex<AppState>>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    pub fn apply(&self, ev: DomainEvent) {
        let mut guard = self.lock();
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, ev);
    }

    /// Reads a projection without cloning the whole state.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
