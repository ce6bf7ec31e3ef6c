/// Header/source inlining.
///
/// Merges a C++ header and its implementation file into one synthetic
/// translation unit: header includes first, then the header's class
/// declarations, then every implementation line that is not an include.
use std::sync::LazyLock;

use regex::Regex;

/// Matches a top-level class declaration through the first closing brace.
///
/// `[^}]*` crosses newlines, so the match ends at the earliest `}` after the
/// opening brace rather than the balanced one. A class containing nested
/// braces (inner types, scopes, lambda bodies) is truncated early. The
/// heuristic is kept as-is for output compatibility with existing stores.
static CLASS_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class\s+\w+\s*\{[^}]*\}").unwrap());

/// Extract `#include` lines from a header, trimmed, in order of appearance.
/// Duplicates are preserved.
pub fn extract_includes(header: &str) -> Vec<String> {
    header
        .split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with("#include"))
        .map(str::to_string)
        .collect()
}

/// Extract class declaration blocks from a header.
pub fn extract_class_declarations(header: &str) -> Vec<String> {
    CLASS_DECL_RE
        .find_iter(header)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Merge a header and its implementation into one synthetic unit.
///
/// Output order: header includes (one per line), a blank line, each class
/// declaration followed by a blank line, then every implementation line
/// whose trimmed form does not start with `#include`, verbatim and in
/// original order. Missing includes or classes simply contribute nothing.
pub fn inline_unit(header: &str, implementation: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.extend(extract_includes(header));
    lines.push(String::new());

    for decl in extract_class_declarations(header) {
        lines.push(decl);
        lines.push(String::new());
    }

    for line in implementation.split('\n') {
        if !line.trim_start().starts_with("#include") {
            lines.push(line.to_string());
        }
    }

    lines.join("\n")
}
