//! Pattern-based attribute extraction for heuristic language families.
//!
//! These rules are tuned for common declaration syntax per family; they are
//! best-effort by design and also serve as the fallback when the precise
//! Python parser fails.

use lazy_static::lazy_static;
use regex::Regex;

use super::CodeAttributes;

lazy_static! {
    // Python fallback patterns.
    static ref PY_FUNC_RE: Regex =
        Regex::new(r"(?m)^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref PY_CLASS_RE: Regex =
        Regex::new(r"(?m)^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref PY_IMPORT_RE: Regex =
        Regex::new(r"(?m)^\s*(?:import|from)\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap();

    // JS-like patterns: function declarations, arrow/function bindings,
    // class declarations, module specifiers.
    static ref JS_FUNC_RE: Regex = Regex::new(
        r"(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)"
    )
    .unwrap();
    static ref JS_BINDING_RE: Regex = Regex::new(
        r"(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][A-Za-z0-9_$]*\s*=>)"
    )
    .unwrap();
    static ref JS_CLASS_RE: Regex =
        Regex::new(r"(?:export\s+)?(?:default\s+)?class\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap();
    static ref JS_IMPORT_RE: Regex =
        Regex::new(r#"import\s+(?:[\w{}*,\s]+?\s+from\s+)?["']([^"']+)["']"#).unwrap();
    static ref JS_REQUIRE_RE: Regex =
        Regex::new(r#"require\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap();

    // Markup patterns: class attribute tokens and linked resources.
    static ref HTML_CLASS_RE: Regex =
        Regex::new(r#"class\s*=\s*["']([^"']+)["']"#).unwrap();
    static ref HTML_LINK_RE: Regex =
        Regex::new(r#"<link\s+[^>]*href\s*=\s*["']([^"']+)["']"#).unwrap();
    static ref HTML_SCRIPT_RE: Regex =
        Regex::new(r#"<script\s+[^>]*src\s*=\s*["']([^"']+)["']"#).unwrap();

    // Generic C-like patterns for unrecognized languages.
    static ref GENERIC_FUNC_RE: Regex =
        Regex::new(r"\b(?:def|function|proc|fn)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref GENERIC_CLASS_RE: Regex =
        Regex::new(r"\bclass\s+([A-Z][A-Za-z0-9_]*)").unwrap();
    static ref GENERIC_IMPORT_RE: Regex =
        Regex::new(r"\b(?:import|include)\s+([A-Za-z0-9_./]+)").unwrap();
}

fn collect(re: &Regex, content: &str) -> impl Iterator<Item = String> {
    re.captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect::<Vec<_>>()
        .into_iter()
}

/// Python heuristics, used when the precise parser is unavailable or fails.
pub fn extract_python(content: &str) -> CodeAttributes {
    let mut attrs = CodeAttributes::default();
    attrs.functions.extend(collect(&PY_FUNC_RE, content));
    attrs.classes.extend(collect(&PY_CLASS_RE, content));
    attrs.dependencies.extend(collect(&PY_IMPORT_RE, content));
    attrs
}

/// JavaScript/TypeScript family extraction.
///
/// A `const`/`let`/`var` binding counts as a function only when the right
/// hand side is a function expression or an arrow function.
pub fn extract_js_like(content: &str) -> CodeAttributes {
    let mut attrs = CodeAttributes::default();
    attrs.functions.extend(collect(&JS_FUNC_RE, content));
    attrs.functions.extend(collect(&JS_BINDING_RE, content));
    attrs.classes.extend(collect(&JS_CLASS_RE, content));
    attrs.dependencies.extend(collect(&JS_IMPORT_RE, content));
    attrs.dependencies.extend(collect(&JS_REQUIRE_RE, content));
    attrs
}

/// Markup extraction: class attribute tokens stand in for classes, linked
/// stylesheets and scripts stand in for dependencies. No functions.
pub fn extract_markup(content: &str) -> CodeAttributes {
    let mut attrs = CodeAttributes::default();
    for caps in HTML_CLASS_RE.captures_iter(content) {
        if let Some(value) = caps.get(1) {
            attrs
                .classes
                .extend(value.as_str().split_whitespace().map(str::to_string));
        }
    }
    attrs.dependencies.extend(collect(&HTML_LINK_RE, content));
    attrs.dependencies.extend(collect(&HTML_SCRIPT_RE, content));
    attrs
}

/// Generic extraction covering common keywords across C-like languages.
pub fn extract_generic(content: &str) -> CodeAttributes {
    let mut attrs = CodeAttributes::default();
    attrs.functions.extend(collect(&GENERIC_FUNC_RE, content));
    attrs.classes.extend(collect(&GENERIC_CLASS_RE, content));
    attrs.dependencies.extend(collect(&GENERIC_IMPORT_RE, content));
    attrs
}
