//! File extension to language label classification.
//!
//! Classification is a pure function of the path's extension, case
//! insensitive. The built-in table can be extended or overridden from
//! configuration; extensions mapped by neither return [`UNKNOWN`].

use std::collections::BTreeMap;
use std::path::Path;

/// Label returned for extensions with no mapping.
pub const UNKNOWN: &str = "Unknown";

/// Built-in extension table. Keys are lowercase, without the dot.
static DEFAULT_EXTENSIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "py" => "Python",
    "pyw" => "Python",
    "js" => "JavaScript",
    "mjs" => "JavaScript",
    "cjs" => "JavaScript",
    "jsx" => "React (JavaScript)",
    "ts" => "TypeScript",
    "tsx" => "React (TypeScript)",
    "html" => "HTML",
    "htm" => "HTML",
    "css" => "CSS",
    "scss" => "CSS",
    "md" => "Markdown",
    "txt" => "Text",
    "json" => "JSON",
    "yml" => "YAML",
    "yaml" => "YAML",
    "toml" => "TOML",
    "java" => "Java",
    "kt" => "Kotlin",
    "c" => "C",
    "h" => "C",
    "cpp" => "C++",
    "cc" => "C++",
    "hpp" => "C++",
    "cs" => "C#",
    "go" => "Go",
    "rs" => "Rust",
    "rb" => "Ruby",
    "php" => "PHP",
    "swift" => "Swift",
    "sh" => "Shell",
    "bash" => "Shell",
    "sql" => "SQL",
};

/// Extension to language label lookup with user overrides.
#[derive(Debug, Clone, Default)]
pub struct LanguageMap {
    overrides: BTreeMap<String, String>,
}

impl LanguageMap {
    /// Create a map with user-supplied overrides layered over the built-in
    /// table. Override keys are normalized to lowercase without the dot.
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(ext, label)| (ext.trim_start_matches('.').to_ascii_lowercase(), label))
            .collect();
        Self { overrides }
    }

    /// Classify a path by its extension. Never fails; unmapped extensions
    /// (and paths without one) yield [`UNKNOWN`].
    pub fn classify(&self, path: &Path) -> &str {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_ascii_lowercase(),
            None => return UNKNOWN,
        };

        if let Some(label) = self.overrides.get(&ext) {
            return label;
        }
        DEFAULT_EXTENSIONS.get(ext.as_str()).copied().unwrap_or(UNKNOWN)
    }
}
