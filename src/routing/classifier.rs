use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::RouteError;
use crate::models::{BackendId, ClassificationResult};
use crate::routing::rules::{
    ambiguous_rule, extensions_of, unambiguous_rule, AMBIGUOUS_EXTENSIONS, FALLBACK_BACKEND,
};

const CONFIDENCE_EXACT: f64 = 1.0;
const CONFIDENCE_AMBIGUOUS_DEFAULT: f64 = 0.7;
const CONFIDENCE_FALLBACK: f64 = 0.5;
const CONFIDENCE_OTHER: f64 = 0.3;

/// Lower-cased suffix of the final path component, leading dot retained.
///
/// Returns an empty string when there is none: `Makefile`, `.gitignore`
/// and `file.` all have an empty suffix.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Decide which back-end handles `path`.
///
/// A valid hint always wins, without checking it against the suffix. An
/// empty hint counts as no hint. Ambiguous suffixes resolve to their first
/// alternative; use [`is_ambiguous`] to see the others.
pub fn detect(path: impl AsRef<Path>, hint: Option<&str>) -> Result<BackendId, RouteError> {
    let path = path.as_ref();

    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
        return hint.parse();
    }

    let extension = normalized_extension(path);
    if extension.is_empty() {
        return Ok(FALLBACK_BACKEND);
    }

    if let Some(backend) = unambiguous_rule(&extension) {
        return Ok(backend);
    }

    if let Some(alternatives) = ambiguous_rule(&extension) {
        return Ok(alternatives[0]);
    }

    Err(RouteError::UnsupportedType {
        path: path.to_path_buf(),
        extension,
    })
}

/// Fixed certainty score for routing `path` to `backend`.
///
/// Depends only on the suffix and the requested identity, so it can be asked
/// about a hypothetical routing (e.g. after a hint).
pub fn confidence(path: impl AsRef<Path>, backend: BackendId) -> f64 {
    let extension = normalized_extension(path.as_ref());

    if extension.is_empty() {
        return if backend == FALLBACK_BACKEND {
            CONFIDENCE_FALLBACK
        } else {
            CONFIDENCE_OTHER
        };
    }

    if unambiguous_rule(&extension) == Some(backend) {
        return CONFIDENCE_EXACT;
    }

    match ambiguous_rule(&extension) {
        Some(alternatives) if alternatives[0] == backend => CONFIDENCE_AMBIGUOUS_DEFAULT,
        _ => CONFIDENCE_OTHER,
    }
}

/// Static ambiguity of the suffix of `path`, independent of any hint.
///
/// Returns `(true, alternatives)` with the full ordered list (default first)
/// or `(false, &[])`.
pub fn is_ambiguous(path: impl AsRef<Path>) -> (bool, &'static [BackendId]) {
    match ambiguous_rule(&normalized_extension(path.as_ref())) {
        Some(alternatives) => (true, alternatives),
        None => (false, &[]),
    }
}

/// Reverse index of the routing tables, optionally limited to one back-end.
///
/// Ambiguous suffixes are listed under every back-end that can serve them.
pub fn extensions_for(
    backend: Option<BackendId>,
) -> BTreeMap<BackendId, BTreeSet<&'static str>> {
    let selected: Vec<BackendId> = match backend {
        Some(id) => vec![id],
        None => BackendId::ALL.to_vec(),
    };

    selected
        .into_iter()
        .map(|id| {
            let mut extensions: BTreeSet<&'static str> =
                extensions_of(id).iter().copied().collect();
            extensions.extend(
                AMBIGUOUS_EXTENSIONS
                    .iter()
                    .filter(|(_, alternatives)| alternatives.contains(&id))
                    .map(|(ext, _)| *ext),
            );
            (id, extensions)
        })
        .collect()
}

/// Detect, score and report ambiguity for `path` in one call.
pub fn classify(
    path: impl AsRef<Path>,
    hint: Option<&str>,
) -> Result<ClassificationResult, RouteError> {
    let path = path.as_ref();
    let backend = detect(path, hint)?;
    let (ambiguous, alternatives) = is_ambiguous(path);

    Ok(ClassificationResult {
        backend,
        confidence: confidence(path, backend),
        ambiguous,
        alternatives: alternatives.to_vec(),
    })
}
