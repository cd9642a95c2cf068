//! Precise Python attribute extraction via tree-sitter.
//!
//! On any parser or query failure the extractor falls back to the Python
//! regex heuristics; extraction never surfaces an error to the walker.
//! With the `tree-sitter` feature disabled, the heuristics are all there is.

#[cfg(feature = "tree-sitter")]
use streaming_iterator::StreamingIterator;
#[cfg(feature = "tree-sitter")]
use tree_sitter::{Parser as TsParser, Query, QueryCursor};

use super::patterns;
use super::CodeAttributes;

/// Tree-sitter query for Python function and class names.
#[cfg(feature = "tree-sitter")]
const SYMBOL_QUERY: &str = r#"
(function_definition name: (identifier) @func_name)
(class_definition name: (identifier) @class_name)
"#;

/// Tree-sitter query for imported module names.
///
/// Captures the module in `import a.b`, `import a.b as c`, and
/// `from a.b import x`. Relative imports (`from . import x`) have no module
/// name and contribute nothing.
#[cfg(feature = "tree-sitter")]
const IMPORT_QUERY: &str = r#"
(import_statement name: (dotted_name) @module)
(import_statement name: (aliased_import name: (dotted_name) @module))
(import_from_statement module_name: (dotted_name) @module)
"#;

/// Extract attributes from Python source.
#[cfg(feature = "tree-sitter")]
pub fn extract(content: &str) -> CodeAttributes {
    match parse_attributes(content) {
        Ok(attrs) => attrs,
        Err(_) => patterns::extract_python(content),
    }
}

/// Extract attributes from Python source (heuristics only).
#[cfg(not(feature = "tree-sitter"))]
pub fn extract(content: &str) -> CodeAttributes {
    patterns::extract_python(content)
}

#[cfg(feature = "tree-sitter")]
fn parse_attributes(content: &str) -> anyhow::Result<CodeAttributes> {
    let language = tree_sitter::Language::from(tree_sitter_python::LANGUAGE);
    let mut parser = TsParser::new();
    parser.set_language(&language)?;

    let source = content.as_bytes();
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse source"))?;
    let root = tree.root_node();

    let mut attrs = CodeAttributes::default();

    let symbol_query = Query::new(&language, SYMBOL_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&symbol_query, root, source);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let capture_name = symbol_query.capture_names()[capture.index as usize];
            let text = capture.node.utf8_text(source).unwrap_or("");
            if text.is_empty() {
                continue;
            }
            match capture_name {
                "func_name" => {
                    attrs.functions.insert(text.to_string());
                }
                "class_name" => {
                    attrs.classes.insert(text.to_string());
                }
                _ => {}
            }
        }
    }

    let import_query = Query::new(&language, IMPORT_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&import_query, root, source);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let text = capture.node.utf8_text(source).unwrap_or("");
            if !text.is_empty() {
                attrs.dependencies.insert(text.to_string());
            }
        }
    }

    Ok(attrs)
}
