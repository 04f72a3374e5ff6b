use crate::models::BackendId;

/// Identity used for files without a suffix (`Makefile`, `Dockerfile`, ...).
pub const FALLBACK_BACKEND: BackendId = BackendId::Document;

pub const XML_EXTENSIONS: &[&str] = &[".xml"];

/// PDFs, Office documents and images.
pub const DOCLING_EXTENSIONS: &[&str] = &[
    ".pdf", ".docx", ".pptx", ".xlsx", ".png", ".jpg", ".jpeg", ".tiff", ".bmp",
];

pub const DATA_EXTENSIONS: &[&str] = &[
    ".csv", ".parquet", ".db", ".sqlite", ".sqlite3", ".feather", ".hdf5", ".h5",
];

/// Code, markup, configuration and plain text.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    // Programming languages
    ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".c", ".cpp", ".h", ".hpp", ".cs", ".go",
    ".rs", ".rb", ".php", ".swift", ".kt", ".scala", ".r", ".m", ".mm", ".sh", ".bash", ".zsh",
    ".fish", ".ps1",
    // Web
    ".html", ".htm", ".css", ".scss", ".sass", ".less", ".vue", ".svelte",
    // Configuration
    ".toml", ".ini", ".cfg", ".conf",
    // Documentation
    ".md", ".markdown", ".rst", ".txt", ".tex", ".adoc",
    // Other
    ".sql", ".graphql", ".proto", ".thrift", ".dockerfile", ".containerfile", ".makefile",
    ".cmake", ".gitignore", ".dockerignore",
];

/// Suffixes servable by more than one back-end. The first alternative is the
/// default and wins when no hint is given.
pub const AMBIGUOUS_EXTENSIONS: &[(&str, &[BackendId])] = &[
    (".json", &[BackendId::Document, BackendId::Data]),
    (".yaml", &[BackendId::Document, BackendId::Xml]),
    (".yml", &[BackendId::Document, BackendId::Xml]),
];

/// Unambiguous suffix table for one back-end.
pub fn extensions_of(backend: BackendId) -> &'static [&'static str] {
    match backend {
        BackendId::Xml => XML_EXTENSIONS,
        BackendId::Docling => DOCLING_EXTENSIONS,
        BackendId::Document => DOCUMENT_EXTENSIONS,
        BackendId::Data => DATA_EXTENSIONS,
    }
}

/// Look up a normalized suffix in the unambiguous tables.
pub fn unambiguous_rule(extension: &str) -> Option<BackendId> {
    BackendId::ALL
        .into_iter()
        .find(|id| extensions_of(*id).contains(&extension))
}

/// Look up a normalized suffix in the ambiguous table.
pub fn ambiguous_rule(extension: &str) -> Option<&'static [BackendId]> {
    AMBIGUOUS_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, alternatives)| *alternatives)
}
