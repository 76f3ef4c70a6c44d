use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all rig operations.
#[derive(Debug, Error, Diagnostic)]
pub enum RigError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed descriptor text.
    #[error("Parse error at line {line}: {message}")]
    #[diagnostic(help(
        "Check the descriptor for unbalanced braces, unterminated strings, or repeated keys"
    ))]
    Parse { line: usize, message: String },

    /// One or more options failed schema validation. All violations are collected.
    #[error(
        "Validation failed with {} violation(s):\n{}",
        .violations.len(),
        bullet_list(.violations)
    )]
    #[diagnostic(help("Run `rig schema` to list the recognized options and their types"))]
    Validation { violations: Vec<String> },

    /// A variant inheritance chain or the dependency graph loops back on itself.
    #[error("Cyclic {kind} chain: {}", cycle_path(.nodes))]
    Cycle { kind: &'static str, nodes: Vec<String> },

    /// A base variant, dependency or signing config name that was never declared.
    #[error("Unresolved {kind} '{name}' referenced by '{referenced_by}'")]
    UnresolvedReference {
        kind: &'static str,
        name: String,
        referenced_by: String,
    },

    /// Invalid global configuration or schema file.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `[a, b, c]` as `a -> b -> c -> a`.
fn cycle_path(nodes: &[String]) -> String {
    let mut path: Vec<&str> = nodes.iter().map(String::as_str).collect();
    if let Some(first) = nodes.first() {
        path.push(first);
    }
    path.join(" -> ")
}

/// Result type for library code that produces typed errors.
pub type Result<T> = std::result::Result<T, RigError>;
