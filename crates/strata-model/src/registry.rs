use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::Model;
use crate::description::{ModelDescription, ModelRef};

/// Cache of model descriptions keyed by type.
///
/// Descriptions are derived on first use. Two threads racing on the same
/// type may both derive it; the first insert wins and both see the same
/// `Arc`.
#[derive(Default)]
pub struct Registry {
    models: RwLock<HashMap<TypeId, Arc<ModelDescription>>>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn describe<M: Model>(&self) -> Arc<ModelDescription> {
        self.describe_ref(&ModelRef::of::<M>())
    }

    pub fn describe_ref(&self, model: &ModelRef) -> Arc<ModelDescription> {
        {
            let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(desc) = models.get(&model.type_id()) {
                return Arc::clone(desc);
            }
        }

        // Derive without holding the lock.
        let derived = Arc::new(model.derive());
        tracing::debug!(
            model = model.type_name(),
            table = %derived.table,
            fields = derived.fields.len(),
            "derived model description"
        );

        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(models.entry(model.type_id()).or_insert(derived))
    }

    pub fn len(&self) -> usize {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
