use thiserror::Error;

#[derive(Debug, Error)]
pub enum TybufError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unresolvable type: {0}")]
    UnsupportedSyntax(String),

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Cannot resolve file: {0}")]
    FileNotFound(String),

    #[error("Cannot find reference \"{target}\" at {at} (referenced from {from})")]
    UnresolvedReference {
        target: String,
        at: String,
        from: String,
    },

    #[error("Path escapes the base directory: {0}")]
    PathTraversal(String),

    #[error("Must specify a resolve_module handler to resolve \"{0}\"")]
    ModuleResolve(String),
}
