//! Routes requests to back-ends and activates them on first use.
//!
//! The orchestrator owns the activation cache. A back-end is activated at
//! most once successfully per orchestrator; failed activations are not
//! remembered, so a provider registered later is picked up on the next call.
//! Activation is serialized by a single lock, while lookups of an already
//! activated back-end only take the cache's read lock.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::backend::{Backend, BackendRegistry};
use crate::error::RouteError;
use crate::models::{BackendId, BackendInfo, Chunk, Options, RoutingInfo};
use crate::routing;

/// Chunking strategy used when the caller has no preference.
pub const DEFAULT_STRATEGY: &str = "auto";

pub struct Orchestrator {
    registry: BackendRegistry,
    cache: RwLock<HashMap<BackendId, Arc<dyn Backend>>>,
    activation: Mutex<()>,
}

impl Orchestrator {
    /// Creates an orchestrator with an empty activation cache.
    pub fn new(registry: BackendRegistry) -> Self {
        Self {
            registry,
            cache: RwLock::new(HashMap::new()),
            activation: Mutex::new(()),
        }
    }

    /// The provider table. Registering here is visible to later activations.
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Analyze `path` with the back-end it routes to.
    pub fn analyze(
        &self,
        path: impl AsRef<Path>,
        hint: Option<&str>,
        options: &Options,
    ) -> Result<serde_json::Value, RouteError> {
        let path = path.as_ref();
        let backend = routing::detect(path, hint)?;
        debug!(
            file = %path.display(),
            backend = %backend,
            confidence = routing::confidence(path, backend),
            "Routing analysis"
        );

        let handle = self.activate(backend, path)?;
        handle.analyze(path, options).map_err(|source| {
            warn!(file = %path.display(), backend = %backend, error = %source, "Analysis failed");
            RouteError::AnalysisFailed {
                path: path.to_path_buf(),
                backend,
                source,
            }
        })
    }

    /// Chunk `path` using a prior analysis result.
    ///
    /// `strategy` is passed through to the back-end; see [`DEFAULT_STRATEGY`].
    pub fn chunk(
        &self,
        path: impl AsRef<Path>,
        prior: &serde_json::Value,
        strategy: &str,
        hint: Option<&str>,
        options: &Options,
    ) -> Result<Vec<Chunk>, RouteError> {
        let path = path.as_ref();
        let backend = routing::detect(path, hint)?;
        debug!(file = %path.display(), backend = %backend, strategy, "Routing chunking");

        let handle = self.activate(backend, path)?;
        handle
            .chunk(path, prior, strategy, options)
            .map_err(|source| {
                warn!(file = %path.display(), backend = %backend, error = %source, "Chunking failed");
                RouteError::ChunkingFailed {
                    path: path.to_path_buf(),
                    backend,
                    source,
                }
            })
    }

    /// Return the cached handle for `backend`, activating it on a miss.
    ///
    /// `path` is only used for the error report.
    pub fn activate(
        &self,
        backend: BackendId,
        path: impl AsRef<Path>,
    ) -> Result<Arc<dyn Backend>, RouteError> {
        if let Some(handle) = self.cached(backend) {
            debug!(backend = %backend, "Activation cache hit");
            return Ok(handle);
        }

        let _guard = self.activation.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished activating while we waited.
        if let Some(handle) = self.cached(backend) {
            return Ok(handle);
        }

        debug!(backend = %backend, target = backend.activation_target(), "Activating backend");
        match self.registry.probe(backend) {
            Some(handle) => {
                self.cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(backend, Arc::clone(&handle));
                Ok(handle)
            }
            None => {
                warn!(backend = %backend, target = backend.activation_target(), "Backend not available");
                Err(RouteError::BackendNotAvailable {
                    backend,
                    path: path.as_ref().to_path_buf(),
                })
            }
        }
    }

    /// Whether `backend` has been activated by this orchestrator.
    pub fn is_activated(&self, backend: BackendId) -> bool {
        self.cached(backend).is_some()
    }

    /// Back-ends that could be activated right now, in canonical order.
    ///
    /// Probes every provider afresh; the activation cache is neither read
    /// nor written.
    pub fn available_backends(&self) -> Vec<BackendId> {
        BackendId::ALL
            .into_iter()
            .filter(|id| self.registry.probe(*id).is_some())
            .collect()
    }

    /// Describe how `path` would be routed without analyzing it.
    pub fn describe_routing(
        &self,
        path: impl AsRef<Path>,
        hint: Option<&str>,
    ) -> Result<RoutingInfo, RouteError> {
        let classification = routing::classify(path, hint)?;

        Ok(RoutingInfo {
            installed: self.registry.probe(classification.backend).is_some(),
            backend: classification.backend,
            confidence: classification.confidence,
            ambiguous: classification.ambiguous,
            alternatives: classification.alternatives,
        })
    }

    /// Static facts about `backend` plus a fresh availability probe.
    pub fn backend_info(&self, backend: BackendId) -> BackendInfo {
        let extensions = routing::extensions_for(Some(backend))
            .remove(&backend)
            .unwrap_or_default();

        BackendInfo {
            name: backend,
            installed: self.registry.probe(backend).is_some(),
            activation_target: backend.activation_target(),
            extensions: extensions.into_iter().collect(),
        }
    }

    /// Supported suffixes, optionally for one back-end only.
    pub fn extensions_for(
        &self,
        backend: Option<BackendId>,
    ) -> BTreeMap<BackendId, BTreeSet<&'static str>> {
        routing::extensions_for(backend)
    }

    fn cached(&self, backend: BackendId) -> Option<Arc<dyn Backend>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&backend)
            .cloned()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        let mut activated: Vec<&BackendId> = cache.keys().collect();
        activated.sort();
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("activated", &activated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Back-end that records what it was asked and can be told to fail.
    #[derive(Default)]
    struct Recorder {
        analyzed: AtomicUsize,
        fail: bool,
    }

    impl Backend for Recorder {
        fn analyze(&self, path: &Path, options: &Options) -> Result<serde_json::Value, BackendError> {
            self.analyzed.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BackendError::Message("cannot parse".to_string()));
            }
            Ok(serde_json::json!({
                "file": path.display().to_string(),
                "options": options,
            }))
        }

        fn chunk(
            &self,
            path: &Path,
            prior: &serde_json::Value,
            strategy: &str,
            _options: &Options,
        ) -> Result<Vec<Chunk>, BackendError> {
            if self.fail {
                return Err(BackendError::UnsupportedStrategy(strategy.to_string()));
            }
            Ok(vec![serde_json::json!({
                "file": path.display().to_string(),
                "strategy": strategy,
                "prior": prior,
            })])
        }
    }

    /// Registry whose `backend` provider counts probes and can be switched on.
    fn counting_registry(
        backend: BackendId,
        available: Arc<AtomicBool>,
    ) -> (BackendRegistry, Arc<AtomicUsize>) {
        let probes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&probes);
        let registry = BackendRegistry::new().with_provider(backend, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            available
                .load(Ordering::SeqCst)
                .then(|| Arc::new(Recorder::default()) as Arc<dyn Backend>)
        });
        (registry, probes)
    }

    #[test]
    fn test_new_orchestrator_has_empty_cache() {
        let orchestrator = Orchestrator::new(BackendRegistry::new());
        for id in BackendId::ALL {
            assert!(!orchestrator.is_activated(id));
        }
    }

    #[test]
    fn test_activate_probes_once_and_returns_same_handle() {
        let (registry, probes) =
            counting_registry(BackendId::Xml, Arc::new(AtomicBool::new(true)));
        let orchestrator = Orchestrator::new(registry);

        let first = orchestrator.activate(BackendId::Xml, "a.xml").unwrap();
        let second = orchestrator.activate(BackendId::Xml, "b.xml").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(probes.load(Ordering::SeqCst), 1);
        assert!(orchestrator.is_activated(BackendId::Xml));
    }

    #[test]
    fn test_failed_activation_is_not_cached() {
        let available = Arc::new(AtomicBool::new(false));
        let (registry, probes) = counting_registry(BackendId::Docling, Arc::clone(&available));
        let orchestrator = Orchestrator::new(registry);

        let err = orchestrator.activate(BackendId::Docling, "report.pdf").err().unwrap();
        assert!(matches!(
            err,
            RouteError::BackendNotAvailable { backend: BackendId::Docling, ref path }
                if path == Path::new("report.pdf")
        ));
        assert!(orchestrator.activate(BackendId::Docling, "report.pdf").is_err());
        assert_eq!(probes.load(Ordering::SeqCst), 2);

        available.store(true, Ordering::SeqCst);
        assert!(orchestrator.activate(BackendId::Docling, "report.pdf").is_ok());
        assert!(orchestrator.activate(BackendId::Docling, "report.pdf").is_ok());
        assert_eq!(probes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_provider_registered_after_construction() {
        let orchestrator = Orchestrator::new(BackendRegistry::new());
        assert!(orchestrator.activate(BackendId::Data, "x.csv").is_err());

        orchestrator
            .registry()
            .register_instance(BackendId::Data, Arc::new(Recorder::default()));
        assert!(orchestrator.activate(BackendId::Data, "x.csv").is_ok());
    }

    #[test]
    fn test_concurrent_first_use_activates_once() {
        let (registry, probes) =
            counting_registry(BackendId::Document, Arc::new(AtomicBool::new(true)));
        let orchestrator = Orchestrator::new(registry);

        let handles: Vec<Arc<dyn Backend>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| orchestrator.activate(BackendId::Document, "a.md").unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(probes.load(Ordering::SeqCst), 1);
        assert!(handles.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn test_analyze_routes_and_passes_options() {
        let backend = Arc::new(Recorder::default());
        let registry = BackendRegistry::new().with_instance(BackendId::Data, backend.clone());
        let orchestrator = Orchestrator::new(registry);

        let mut options = Options::new();
        options.insert("sample_rows".to_string(), serde_json::json!(10));
        let result = orchestrator.analyze("data.csv", None, &options).unwrap();

        assert_eq!(result["file"], "data.csv");
        assert_eq!(result["options"]["sample_rows"], 10);
        assert_eq!(backend.analyzed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_analyze_with_hint() {
        let data = Arc::new(Recorder::default());
        let document = Arc::new(Recorder::default());
        let registry = BackendRegistry::new()
            .with_instance(BackendId::Data, data.clone())
            .with_instance(BackendId::Document, document.clone());
        let orchestrator = Orchestrator::new(registry);

        orchestrator.analyze("data.json", None, &Options::new()).unwrap();
        orchestrator.analyze("data.json", Some("data"), &Options::new()).unwrap();

        assert_eq!(document.analyzed.load(Ordering::SeqCst), 1);
        assert_eq!(data.analyzed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_routing_errors_are_not_wrapped() {
        let orchestrator = Orchestrator::new(BackendRegistry::new());

        let err = orchestrator.analyze("x.qqq", None, &Options::new()).unwrap_err();
        assert!(matches!(err, RouteError::UnsupportedType { ref extension, .. } if extension == ".qqq"));

        let err = orchestrator.analyze("x.csv", Some("excel"), &Options::new()).unwrap_err();
        assert!(matches!(err, RouteError::InvalidHint { .. }));

        let err = orchestrator.analyze("report.pdf", None, &Options::new()).unwrap_err();
        assert!(matches!(err, RouteError::BackendNotAvailable { backend: BackendId::Docling, .. }));
        assert!(err.to_string().contains("docling-analysis-framework"));
    }

    #[test]
    fn test_analysis_failure_is_wrapped_with_cause() {
        let failing = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let registry = BackendRegistry::new().with_instance(BackendId::Xml, failing);
        let orchestrator = Orchestrator::new(registry);

        let err = orchestrator.analyze("feed.xml", None, &Options::new()).unwrap_err();
        match &err {
            RouteError::AnalysisFailed { path, backend, source } => {
                assert_eq!(path, Path::new("feed.xml"));
                assert_eq!(*backend, BackendId::Xml);
                assert!(matches!(source, BackendError::Message(msg) if msg == "cannot parse"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.source().is_some());

        // Still usable, and the handle stays cached.
        assert!(orchestrator.is_activated(BackendId::Xml));
        assert!(orchestrator.analyze("feed.xml", None, &Options::new()).is_err());
    }

    #[test]
    fn test_chunk_routes_with_strategy() {
        let registry =
            BackendRegistry::new().with_instance(BackendId::Docling, Arc::new(Recorder::default()));
        let orchestrator = Orchestrator::new(registry);

        let prior = serde_json::json!({"pages": 2});
        let chunks = orchestrator
            .chunk("report.pdf", &prior, DEFAULT_STRATEGY, None, &Options::new())
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0]["strategy"], "auto");
        assert_eq!(chunks[0]["prior"]["pages"], 2);
    }

    #[test]
    fn test_chunk_failure_is_wrapped() {
        let failing = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let registry = BackendRegistry::new().with_instance(BackendId::Document, failing);
        let orchestrator = Orchestrator::new(registry);

        let err = orchestrator
            .chunk("notes.txt", &serde_json::Value::Null, "semantic", None, &Options::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::ChunkingFailed {
                backend: BackendId::Document,
                source: BackendError::UnsupportedStrategy(ref s),
                ..
            } if s == "semantic"
        ));
    }

    #[test]
    fn test_available_backends_ignores_cache() {
        let available = Arc::new(AtomicBool::new(true));
        let (registry, probes) = counting_registry(BackendId::Data, Arc::clone(&available));
        registry.register_instance(BackendId::Xml, Arc::new(Recorder::default()));
        let orchestrator = Orchestrator::new(registry);

        let before = orchestrator.available_backends();
        assert_eq!(before, vec![BackendId::Xml, BackendId::Data]);
        assert!(!orchestrator.is_activated(BackendId::Data));

        orchestrator.activate(BackendId::Data, "x.csv").unwrap();
        let after = orchestrator.available_backends();
        assert_eq!(before, after);
        assert_eq!(probes.load(Ordering::SeqCst), 3);

        // Re-probed, not read from the cache.
        available.store(false, Ordering::SeqCst);
        assert_eq!(orchestrator.available_backends(), vec![BackendId::Xml]);
        assert!(orchestrator.is_activated(BackendId::Data));
    }

    #[test]
    fn test_available_backends_none_installed() {
        let orchestrator = Orchestrator::new(BackendRegistry::new());
        assert!(orchestrator.available_backends().is_empty());
    }

    #[test]
    fn test_describe_routing() {
        let registry =
            BackendRegistry::new().with_instance(BackendId::Xml, Arc::new(Recorder::default()));
        let orchestrator = Orchestrator::new(registry);

        let info = orchestrator.describe_routing("config.xml", None).unwrap();
        assert_eq!(info.backend, BackendId::Xml);
        assert_eq!(info.confidence, 1.0);
        assert!(!info.ambiguous);
        assert!(info.alternatives.is_empty());
        assert!(info.installed);

        let info = orchestrator.describe_routing("document.json", None).unwrap();
        assert_eq!(info.backend, BackendId::Document);
        assert_eq!(info.confidence, 0.7);
        assert!(info.ambiguous);
        assert_eq!(info.alternatives, vec![BackendId::Document, BackendId::Data]);
        assert!(!info.installed);

        let info = orchestrator.describe_routing("document.json", Some("data")).unwrap();
        assert_eq!(info.backend, BackendId::Data);

        // Describing never activates.
        assert!(!orchestrator.is_activated(BackendId::Xml));
    }

    #[test]
    fn test_backend_info() {
        let orchestrator = Orchestrator::new(BackendRegistry::new());
        let info = orchestrator.backend_info(BackendId::Xml);

        assert_eq!(info.name, BackendId::Xml);
        assert_eq!(info.activation_target, "xml-analysis-framework");
        assert!(!info.installed);
        assert!(info.extensions.contains(&".xml"));
        let mut sorted = info.extensions.clone();
        sorted.sort_unstable();
        assert_eq!(info.extensions, sorted);
    }
}
