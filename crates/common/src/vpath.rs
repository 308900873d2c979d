//! Virtual path handling.
//!
//! Paths in the aggregated namespace are absolute, slash-separated and
//! independent of how the owning driver addresses entries. Name comparison
//! downstream is exact byte-for-byte; drivers differ in what they allow, so
//! no case folding or unicode normalization happens here.

/// Normalize a virtual path: absolute, single separators, no trailing slash
/// except for the root itself. `.` segments are dropped and `..` resolves
/// upward but never above the root, so a normalized path can always be
/// joined under an account's root folder safely.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let mut out = String::with_capacity(path.len() + 1);
    for part in &parts {
        out.push('/');
        out.push_str(part);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

pub fn is_root(path: &str) -> bool {
    path == "/"
}

/// Split a normalized, non-root path into `(parent, leaf)`.
///
/// The parent is itself normalized (`"/a/b" -> ("/a", "b")`, `"/a" -> ("/",
/// "a")`).
pub fn split(path: &str) -> (String, String) {
    debug_assert!(path.starts_with('/') && path != "/");
    match path.rfind('/') {
        Some(0) => ("/".to_string(), path[1..].to_string()),
        Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
        None => ("/".to_string(), path.to_string()),
    }
}

pub fn parent_of(path: &str) -> String {
    if is_root(path) {
        return "/".to_string();
    }
    split(path).0
}

pub fn join(parent: &str, leaf: &str) -> String {
    if is_root(parent) {
        format!("/{}", leaf)
    } else {
        format!("{}/{}", parent, leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_variants() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("a/b"), "/a/b");
        assert_eq!(normalize("/a/b/"), "/a/b");
        assert_eq!(normalize("//a///b"), "/a/b");
    }

    #[test]
    fn normalize_resolves_dot_segments() {
        assert_eq!(normalize("/a/./b"), "/a/b");
        assert_eq!(normalize("/a/../b"), "/b");
        assert_eq!(normalize("/../../etc"), "/etc");
    }

    #[test]
    fn split_and_join_round_trip() {
        for path in ["/a", "/a/b", "/a/b/c.txt"] {
            let (parent, leaf) = split(path);
            assert_eq!(join(&parent, &leaf), path);
        }
        assert_eq!(split("/a"), ("/".to_string(), "a".to_string()));
        assert_eq!(split("/a/b"), ("/a".to_string(), "b".to_string()));
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(parent_of("/"), "/");
        assert_eq!(parent_of("/x"), "/");
        assert_eq!(parent_of("/x/y"), "/x");
    }
}
