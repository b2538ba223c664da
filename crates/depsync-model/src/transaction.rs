use depsync_util::errors::DepsyncError;

use crate::store::{ModifiableRootModel, ProjectModelStore};

/// Owns a modifiable model until it is finished.
///
/// [`finish`](Self::finish) commits when something changed and disposes
/// otherwise. A transaction dropped before finishing (an early return, an
/// error or a panic) disposes its model.
pub struct ModelTransaction<'a> {
    model: Option<Box<dyn ModifiableRootModel + 'a>>,
}

impl<'a> ModelTransaction<'a> {
    pub fn begin(store: &'a dyn ProjectModelStore, module: &str) -> Result<Self, DepsyncError> {
        Ok(Self {
            model: Some(store.modifiable_model(module)?),
        })
    }

    pub fn model(&self) -> &(dyn ModifiableRootModel + 'a) {
        match self.model.as_deref() {
            Some(model) => model,
            None => unreachable!("model is only taken when the transaction ends"),
        }
    }

    pub fn model_mut(&mut self) -> &mut (dyn ModifiableRootModel + 'a) {
        match self.model.as_deref_mut() {
            Some(model) => model,
            None => unreachable!("model is only taken when the transaction ends"),
        }
    }

    /// End the transaction. Returns whether a commit happened.
    pub fn finish(mut self) -> Result<bool, DepsyncError> {
        let Some(model) = self.model.take() else {
            return Ok(false);
        };
        if model.is_changed() {
            model.commit()?;
            Ok(true)
        } else {
            model.dispose();
            Ok(false)
        }
    }
}

impl Drop for ModelTransaction<'_> {
    fn drop(&mut self) {
        if let Some(model) = self.model.take() {
            tracing::debug!(
                "Discarding uncommitted changes to module {}",
                model.module_name()
            );
            model.dispose();
        }
    }
}
