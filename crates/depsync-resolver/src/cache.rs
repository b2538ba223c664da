//! Per-module memo of engines and parsed manifests.
//!
//! Engines are expensive to configure, so one is built per module and reused
//! until the module's settings or manifest change.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use depsync_core::project::ModuleInfo;
use depsync_core::report::ModuleDescriptor;
use depsync_core::settings::EngineSettings;
use depsync_util::errors::DepsyncError;

use crate::engine::{EngineFactory, ResolutionEngine};

#[derive(Default)]
struct Entry {
    engine: Option<Arc<dyn ResolutionEngine>>,
    descriptor: Option<ModuleDescriptor>,
}

/// Engine and manifest cache keyed by module name.
pub struct EngineCache {
    factory: Arc<dyn EngineFactory>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl EngineCache {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Engine for `module`, created on first use with the settings returned
    /// by `settings`.
    pub fn engine<F>(
        &self,
        module: &ModuleInfo,
        settings: F,
    ) -> Result<Arc<dyn ResolutionEngine>, DepsyncError>
    where
        F: FnOnce() -> Result<EngineSettings, DepsyncError>,
    {
        if let Some(engine) = self.lock().get(&module.name).and_then(|e| e.engine.clone()) {
            return Ok(engine);
        }
        // Built outside the lock; a concurrent builder for the same module
        // loses to whichever engine got stored first.
        let settings = settings()?;
        let engine = self.factory.create(module, &settings)?;
        tracing::debug!("Configured resolution engine for module {}", module.name);
        let mut entries = self.lock();
        let entry = entries.entry(module.name.clone()).or_default();
        Ok(entry.engine.get_or_insert(engine).clone())
    }

    /// Parsed manifest of `module`. Only successful parses are remembered.
    pub fn descriptor(
        &self,
        module: &ModuleInfo,
        engine: &dyn ResolutionEngine,
        manifest: &Path,
    ) -> Result<ModuleDescriptor, DepsyncError> {
        if let Some(d) = self
            .lock()
            .get(&module.name)
            .and_then(|e| e.descriptor.clone())
        {
            return Ok(d);
        }
        let descriptor = engine
            .parse_descriptor(manifest)
            .map_err(|e| e.for_manifest(&module.name, manifest))?;
        self.lock()
            .entry(module.name.clone())
            .or_default()
            .descriptor = Some(descriptor.clone());
        Ok(descriptor)
    }

    /// Cached manifest only; never parses.
    pub fn cached_descriptor(&self, module: &str) -> Option<ModuleDescriptor> {
        self.lock().get(module).and_then(|e| e.descriptor.clone())
    }

    pub fn invalidate(&self, module: &str) {
        if self.lock().remove(module).is_some() {
            tracing::debug!("Invalidated cached engine for module {module}");
        }
    }

    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use depsync_core::artifact::Artifact;
    use depsync_core::coordinate::ModuleRevisionId;
    use depsync_core::report::{ArtifactDownload, ResolveOptions, ResolveReport};

    use crate::engine::EngineError;

    struct CountingEngine {
        parses: AtomicUsize,
    }

    impl ResolutionEngine for CountingEngine {
        fn parse_descriptor(&self, _manifest: &Path) -> Result<ModuleDescriptor, EngineError> {
            self.parses.fetch_add(1, Ordering::SeqCst);
            Ok(ModuleDescriptor {
                id: ModuleRevisionId::new("org", "app", "1.0"),
                configurations: Vec::new(),
            })
        }

        fn resolve(
            &self,
            _manifest: &Path,
            _options: &ResolveOptions,
        ) -> Result<ResolveReport, EngineError> {
            Ok(ResolveReport::default())
        }

        fn download(&self, artifact: &Artifact) -> Result<ArtifactDownload, EngineError> {
            Ok(ArtifactDownload {
                artifact: artifact.clone(),
                local_file: None,
            })
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: AtomicUsize,
    }

    impl EngineFactory for CountingFactory {
        fn create(
            &self,
            _module: &ModuleInfo,
            _settings: &EngineSettings,
        ) -> Result<Arc<dyn ResolutionEngine>, DepsyncError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(CountingEngine {
                parses: AtomicUsize::new(0),
            }))
        }
    }

    fn module(name: &str) -> ModuleInfo {
        ModuleInfo {
            name: name.to_string(),
            dir: name.into(),
            manifest: None,
            organisation: None,
        }
    }

    #[test]
    fn engine_is_memoized_until_invalidated() {
        let factory = Arc::new(CountingFactory::default());
        let cache = EngineCache::new(factory.clone());
        let app = module("app");

        let first = cache.engine(&app, || Ok(EngineSettings::default())).unwrap();
        let second = cache
            .engine(&app, || panic!("settings must not be recomputed"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);

        cache.invalidate("app");
        cache.engine(&app, || Ok(EngineSettings::default())).unwrap();
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn settings_errors_are_not_cached() {
        let cache = EngineCache::new(Arc::new(CountingFactory::default()));
        let app = module("app");
        let err = cache.engine(&app, || {
            Err(DepsyncError::Config {
                message: "broken".into(),
            })
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn descriptor_is_parsed_once() {
        let cache = EngineCache::new(Arc::new(CountingFactory::default()));
        let engine = CountingEngine {
            parses: AtomicUsize::new(0),
        };
        let app = module("app");
        let manifest = Path::new("app/ivy.xml");
        cache.descriptor(&app, &engine, manifest).unwrap();
        cache.descriptor(&app, &engine, manifest).unwrap();
        assert_eq!(engine.parses.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_descriptor("app").unwrap().id.revision, "1.0");

        cache.invalidate_all();
        assert!(cache.cached_descriptor("app").is_none());
    }
}
