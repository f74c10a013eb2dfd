//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, IdPort, KeyValueStore};
use crate::repositories::FormLibrary;
use crate::stores::BuilderSessionStore;

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub library: FormLibrary,
    pub builders: BuilderSessionStore,
    pub clock: Arc<dyn ClockPort>,
    pub ids: Arc<dyn IdPort>,
}

impl App {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn ClockPort>,
        ids: Arc<dyn IdPort>,
    ) -> Self {
        Self {
            library: FormLibrary::new(store),
            builders: BuilderSessionStore::new(),
            clock,
            ids,
        }
    }
}
