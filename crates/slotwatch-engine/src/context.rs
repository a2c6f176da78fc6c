//! Collaborators shared by every engine command.

use slotwatch_core::clock::SharedClock;
use slotwatch_core::classify::RowClassifier;
use slotwatch_store::kv::SharedStore;
use std::sync::Arc;

use crate::source::DataSource;

#[derive(Clone)]
pub struct EngineContext {
    pub store: SharedStore,
    pub clock: SharedClock,
    pub source: Arc<dyn DataSource>,
    pub classifier: Arc<dyn RowClassifier>,
}

impl EngineContext {
    pub fn new(
        store: SharedStore,
        clock: SharedClock,
        source: Arc<dyn DataSource>,
        classifier: Arc<dyn RowClassifier>,
    ) -> Self {
        Self {
            store,
            clock,
            source,
            classifier,
        }
    }
}
