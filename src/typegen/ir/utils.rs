//! Common utilities for Reason code generation.
//!
//! This module provides shared helper functions used across extraction,
//! finalization and printing.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::typegen::error::TypegenError;

/// Reason keywords that cannot be used as record field names.
pub static REASON_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "and",
        "as",
        "assert",
        "begin",
        "class",
        "constraint",
        "do",
        "done",
        "downto",
        "else",
        "end",
        "esfun",
        "exception",
        "external",
        "false",
        "for",
        "fun",
        "function",
        "functor",
        "if",
        "in",
        "include",
        "inherit",
        "initializer",
        "lazy",
        "let",
        "module",
        "mutable",
        "new",
        "nonrec",
        "object",
        "of",
        "open",
        "or",
        "pri",
        "private",
        "pub",
        "rec",
        "sig",
        "struct",
        "switch",
        "then",
        "to",
        "true",
        "try",
        "type",
        "val",
        "virtual",
        "when",
        "while",
        "with",
    ]
    .into_iter()
    .collect()
});

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first letter of a string.
pub fn uncapitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Print a record field key, escaping Reason reserved words.
///
/// Reserved words get a trailing underscore plus a `[@bs.as]` attribute so
/// the compiled runtime object keeps the original key.
pub fn print_record_key(name: &str) -> String {
    if REASON_RESERVED_WORDS.contains(name) {
        format!("[@bs.as \"{name}\"] {name}_")
    } else {
        name.to_string()
    }
}

/// Join a leaf-first path into a root-first identifier, e.g.
/// `["edges", "todos", "viewer", "response"]` -> `"response_viewer_todos_edges"`.
pub fn path_to_name(path: &[String]) -> Result<String, TypegenError> {
    if path.is_empty() {
        return Err(TypegenError::ObjectPathEmpty);
    }
    let mut segments: Vec<&str> = path.iter().map(String::as_str).collect();
    segments.reverse();
    Ok(uncapitalize_first(&segments.join("_")))
}

/// Derive a unique record name from an object path.
///
/// The base name is the root-first join of the path; collisions get a
/// numeric suffix. The chosen name is registered in `used_record_names`.
pub fn find_appropriate_obj_name(
    used_record_names: &mut HashSet<String>,
    path: &[String],
) -> Result<String, TypegenError> {
    let base = path_to_name(path)?;
    let mut candidate = base.clone();
    let mut attempt = 1usize;
    while used_record_names.contains(&candidate) {
        attempt += 1;
        candidate = format!("{base}_{attempt}");
    }
    used_record_names.insert(candidate.clone());
    Ok(candidate)
}

/// The printed type name of an extracted enum.
pub fn enum_type_name(name: &str) -> String {
    format!("enum_{name}")
}

/// Strip a trailing suffix from a fragment reference name, if present.
pub fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("todo"), "Todo");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("A"), "A");
    }

    #[test]
    fn test_uncapitalize_first() {
        assert_eq!(uncapitalize_first("UpdateTodoInput"), "updateTodoInput");
        assert_eq!(uncapitalize_first("a"), "a");
        assert_eq!(uncapitalize_first(""), "");
    }

    #[test]
    fn test_print_record_key() {
        assert_eq!(print_record_key("id"), "id");
        assert_eq!(print_record_key("type"), "[@bs.as \"type\"] type_");
        assert_eq!(print_record_key("switch"), "[@bs.as \"switch\"] switch_");
    }

    #[test]
    fn test_path_to_name() {
        let path = vec![
            "edges".to_string(),
            "todos".to_string(),
            "viewer".to_string(),
            "response".to_string(),
        ];
        assert_eq!(
            path_to_name(&path).ok(),
            Some("response_viewer_todos_edges".to_string())
        );
    }

    #[test]
    fn test_path_to_name_empty_is_an_error() {
        assert!(matches!(
            path_to_name(&[]),
            Err(TypegenError::ObjectPathEmpty)
        ));
    }

    #[test]
    fn test_find_appropriate_obj_name_deduplicates() {
        let mut used = HashSet::new();
        let path = vec!["node".to_string(), "response".to_string()];
        assert_eq!(
            find_appropriate_obj_name(&mut used, &path).ok(),
            Some("response_node".to_string())
        );
        assert_eq!(
            find_appropriate_obj_name(&mut used, &path).ok(),
            Some("response_node_2".to_string())
        );
        assert_eq!(
            find_appropriate_obj_name(&mut used, &path).ok(),
            Some("response_node_3".to_string())
        );
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("TodoItem_todo$ref", "$ref"), "TodoItem_todo");
        assert_eq!(strip_suffix("TodoItem_todo", "$ref"), "TodoItem_todo");
    }
}
