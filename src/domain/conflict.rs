//! Resolution conflicts
//!
//! Conflicts are produced by the capability resolver and are never silently
//! dropped: errors terminate the pipeline, warnings are surfaced in the result.

use std::fmt;

use serde::Serialize;

/// Conflict severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What went wrong during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// No module provides a required capability
    MissingCapability,
    /// More than one module provides a capability that needs exactly one
    AmbiguousProvider,
    /// A dependency id is neither present nor known
    MissingDependency,
    /// The genome references a module the registry does not know
    UnknownModule,
    /// Two resolved modules declare each other incompatible
    Incompatible,
    /// Module does not support the project framework
    UnsupportedFramework,
    /// More than one framework module was resolved
    MultipleFrameworks,
    /// Feature request expanded to nothing or ambiguously
    FeatureExpansion,
    /// Same module listed twice in the genome
    Duplicate,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictKind::MissingCapability => "missing capability",
            ConflictKind::AmbiguousProvider => "ambiguous provider",
            ConflictKind::MissingDependency => "missing dependency",
            ConflictKind::UnknownModule => "unknown module",
            ConflictKind::Incompatible => "incompatible modules",
            ConflictKind::UnsupportedFramework => "unsupported framework",
            ConflictKind::MultipleFrameworks => "multiple frameworks",
            ConflictKind::FeatureExpansion => "feature expansion",
            ConflictKind::Duplicate => "duplicate module",
        };
        f.write_str(name)
    }
}

/// A structured resolution error or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub module_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    pub message: String,
    pub suggestions: Vec<String>,
    pub severity: Severity,
}

impl Conflict {
    pub fn error(kind: ConflictKind, module_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            module_id: module_id.into(),
            capability: None,
            message: message.into(),
            suggestions: Vec::new(),
            severity: Severity::Error,
        }
    }

    pub fn warning(kind: ConflictKind, module_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, module_id, message)
        }
    }

    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// One-line rendering with suggestions, used in aggregated reports
    pub fn describe(&self) -> String {
        let mut line = format!("[{}] {}: {}", self.kind, self.module_id, self.message);
        if !self.suggestions.is_empty() {
            line.push_str(&format!(" (try: {})", self.suggestions.join(", ")));
        }
        line
    }
}
