//! Static extraction of code attributes from file content.
//!
//! One extractor, parameterized by language family: Python gets a real
//! parser (with a mandatory regex fallback), C-like and JS-like languages
//! get family-tuned patterns, markup gets structural attributes, and
//! everything else gets a generic pattern set. Extraction never fails and
//! never aborts a walk; the worst case is empty results.

pub mod patterns;
pub mod python;

use std::collections::BTreeSet;

/// Functions, classes, and imported dependencies found in one file.
///
/// All three collections have set semantics: deduplicated and iterated in
/// sorted order, so extraction order never leaks into results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeAttributes {
    pub functions: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub dependencies: BTreeSet<String>,
}

impl CodeAttributes {
    /// Consume the attributes into sorted vectors for node assembly.
    pub fn into_sorted_vecs(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            self.functions.into_iter().collect(),
            self.classes.into_iter().collect(),
            self.dependencies.into_iter().collect(),
        )
    }
}

/// Language families with distinct extraction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    /// Parsed precisely; falls back to patterns on parser failure.
    Python,
    /// JavaScript, TypeScript, and the React variants.
    JsLike,
    /// HTML and CSS: class attributes and linked resources.
    Markup,
    /// Everything else: generic C-like declaration patterns.
    Generic,
}

impl LanguageFamily {
    /// Map a classifier label to its extraction family.
    pub fn for_label(label: &str) -> Self {
        match label {
            "Python" => LanguageFamily::Python,
            "JavaScript" | "TypeScript" | "React (JavaScript)" | "React (TypeScript)" => {
                LanguageFamily::JsLike
            }
            "HTML" | "CSS" => LanguageFamily::Markup,
            _ => LanguageFamily::Generic,
        }
    }
}

/// Extract functions, classes, and dependencies from file content.
pub fn extract(content: &str, label: &str) -> CodeAttributes {
    match LanguageFamily::for_label(label) {
        LanguageFamily::Python => python::extract(content),
        LanguageFamily::JsLike => patterns::extract_js_like(content),
        LanguageFamily::Markup => patterns::extract_markup(content),
        LanguageFamily::Generic => patterns::extract_generic(content),
    }
}
