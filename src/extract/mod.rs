//! Snapshot extraction from source trees
//!
//! Best-effort, regex-driven harvesting of the structural facts reconciliation
//! needs. Nothing here parses a grammar; declarations the patterns miss are
//! simply absent from the snapshot.
//!
//! - `backend`: ASP.NET-style controllers, DTO classes, service interfaces and
//!   their implementations
//! - `frontend`: TypeScript service modules calling an HTTP client object, and
//!   exported interface types

pub mod backend;
pub mod frontend;

pub use backend::extract_backend;
pub use frontend::extract_frontend;

/// Inner text of the `{ ... }` block whose opening brace sits at `open`.
///
/// An unterminated block runs to the end of `content`.
pub(crate) fn block_at(content: &str, open: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[open + 1..i]);
                }
            }
            _ => {}
        }
    }
    Some(&content[open + 1..])
}

/// Keep only the outermost level of a block body; nested blocks become `{}`.
pub(crate) fn top_level(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut depth = 0usize;

    for c in body.chars() {
        match c {
            '{' => {
                if depth == 0 {
                    out.push('{');
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    out.push('}');
                }
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Text between the `<` at `open` and its matching `>`.
pub(crate) fn generic_argument(text: &str, open: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'<') {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open + 1..i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn file_stem(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_at_balances_nested_braces() {
        let src = "class A { int X { get; set; } void F() { if (x) { } } } tail";
        let open = src.find('{').unwrap();
        assert_eq!(
            block_at(src, open).unwrap(),
            " int X { get; set; } void F() { if (x) { } } "
        );
        assert!(block_at(src, 0).is_none());
    }

    #[test]
    fn test_block_at_unterminated() {
        assert_eq!(block_at("{ open", 0).unwrap(), " open");
    }

    #[test]
    fn test_top_level_collapses_nested() {
        assert_eq!(
            top_level(" id: string\n address: { street: string }\n"),
            " id: string\n address: {}\n"
        );
    }

    #[test]
    fn test_generic_argument() {
        let t = "Task<ActionResult<List<ProductDto>>>";
        let open = t.find("ActionResult<").unwrap() + "ActionResult".len();
        assert_eq!(generic_argument(t, open), Some("List<ProductDto>"));
        assert_eq!(generic_argument("Task<", 4), None);
    }
}
