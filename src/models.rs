use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// Options passed through untouched to a back-end.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// A single chunk produced by a back-end. The shape is back-end defined.
pub type Chunk = serde_json::Value;

/// The closed set of analysis back-ends a file can be routed to.
///
/// Declaration order is the canonical order used by every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    Xml,
    Docling,
    Document,
    Data,
}

impl BackendId {
    /// Every identity, in canonical order.
    pub const ALL: [BackendId; 4] = [
        BackendId::Xml,
        BackendId::Docling,
        BackendId::Document,
        BackendId::Data,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Xml => "xml",
            BackendId::Docling => "docling",
            BackendId::Document => "document",
            BackendId::Data => "data",
        }
    }

    /// Stable provider name the orchestrator resolves this identity through.
    pub fn activation_target(&self) -> &'static str {
        match self {
            BackendId::Xml => "xml-analysis-framework",
            BackendId::Docling => "docling-analysis-framework",
            BackendId::Document => "document-analysis-framework",
            BackendId::Data => "data-analysis-framework",
        }
    }

    /// Name of the installable extra that ships this back-end.
    pub fn install_extra(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = RouteError;

    /// Parse a hint. Matching is exact: tags are lower-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| RouteError::InvalidHint {
                hint: s.to_string(),
            })
    }
}

/// Outcome of classifying one file. Produced fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub backend: BackendId,
    /// Static certainty score in `[0, 1]`; advisory only.
    pub confidence: f64,
    pub ambiguous: bool,
    /// Full ordered alternative list when `ambiguous`, otherwise empty.
    pub alternatives: Vec<BackendId>,
}

/// Read-only routing report for a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingInfo {
    pub backend: BackendId,
    pub confidence: f64,
    pub ambiguous: bool,
    pub alternatives: Vec<BackendId>,
    /// Whether the routed back-end could be activated right now.
    pub installed: bool,
}

/// Static description of one back-end plus its current availability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendInfo {
    pub name: BackendId,
    pub installed: bool,
    pub activation_target: &'static str,
    pub extensions: Vec<&'static str>,
}
