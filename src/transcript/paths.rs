//! Base-relative path rewriting.
//!
//! Paths are canonicalized lexically: `.` and empty segments are dropped and
//! `..` pops a segment (never above the root). Both `/` and `\` count as
//! separators and `C:`-style drive prefixes are understood, so transcripts
//! recorded on either platform are handled the same way. The filesystem and
//! the current directory are never consulted.
//!
//! Only absolute paths are rewritten. A relative path is already free of the
//! machine's directory layout, which is also what makes rewriting idempotent.

use regex::Regex;

/// Characters that may appear inside a path segment. An embedded base path
/// preceded by one of these is part of a longer path and left alone.
fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '/' | '\\' | '.' | '_' | '-' | '~')
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Root {
    /// `/` or `\`
    Slash,
    /// `C:\`, stored upper-case.
    Drive(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AbsolutePath {
    root: Root,
    segments: Vec<String>,
    separator: char,
}

impl AbsolutePath {
    /// Parse and normalize `raw`. Returns `None` for relative paths.
    fn parse(raw: &str) -> Option<Self> {
        let (root, rest) = if raw.starts_with(['/', '\\']) {
            (Root::Slash, raw)
        } else {
            let mut chars = raw.chars();
            match (chars.next(), chars.next(), chars.next()) {
                (Some(drive), Some(':'), Some('/' | '\\')) if drive.is_ascii_alphabetic() => {
                    (Root::Drive(drive.to_ascii_uppercase()), &raw[2..])
                }
                _ => return None,
            }
        };

        let separator = rest.chars().find(|c| matches!(c, '/' | '\\')).unwrap_or('/');
        let mut segments: Vec<String> = Vec::new();
        for segment in rest.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other.to_string()),
            }
        }

        Some(Self {
            root,
            segments,
            separator,
        })
    }

    /// Segments of `self` below `base`, or `None` if `self` is not under it.
    fn strip_base<'a>(&'a self, base: &Self) -> Option<&'a [String]> {
        if self.root != base.root {
            return None;
        }
        self.segments.strip_prefix(base.segments.as_slice())
    }
}

/// Rewrites paths under one base directory into base-relative form.
///
/// Build one per stream and reuse it: the embedded-path pattern is compiled
/// once here.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    base: Option<AbsolutePath>,
    embedded: Option<Regex>,
}

impl PathRewriter {
    /// Create a rewriter for `base`. An empty or relative base disables
    /// rewriting.
    #[must_use]
    pub fn new(base: &str) -> Self {
        let base = AbsolutePath::parse(base.trim());
        let embedded = base
            .as_ref()
            .filter(|b| !b.segments.is_empty())
            .and_then(|b| Regex::new(&embedded_pattern(b)).ok());
        Self { base, embedded }
    }

    /// A rewriter that leaves everything unchanged.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            base: None,
            embedded: None,
        }
    }

    /// Rewrite a single path.
    ///
    /// Returns the path relative to the base when it lies under it (`"."`
    /// when they are equal) and the input unchanged otherwise.
    #[must_use]
    pub fn rewrite_path(&self, path: &str) -> String {
        let Some(base) = &self.base else {
            return path.to_string();
        };
        let Some(target) = AbsolutePath::parse(path) else {
            return path.to_string();
        };
        match target.strip_base(base) {
            Some([]) => ".".to_string(),
            Some(rest) => rest.join(target.separator.to_string().as_str()),
            None => path.to_string(),
        }
    }

    /// Rewrite base-path occurrences inside free text.
    ///
    /// Text that is itself a single absolute path goes through
    /// [`rewrite_path`](Self::rewrite_path). Otherwise every occurrence of
    /// the base directory followed by a separator is removed, turning
    /// `/base/proj/src/x.ts` into `src/x.ts` and leaving the surrounding
    /// text as it was.
    #[must_use]
    pub fn rewrite_text(&self, text: &str) -> String {
        if self.base.is_none() {
            return text.to_string();
        }
        if !text.is_empty()
            && !text.chars().any(char::is_whitespace)
            && AbsolutePath::parse(text).is_some()
        {
            return self.rewrite_path(text);
        }
        let Some(pattern) = &self.embedded else {
            return text.to_string();
        };

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for found in pattern.find_iter(text) {
            let starts_path = text[..found.start()]
                .chars()
                .next_back()
                .is_none_or(|c| !is_path_char(c));
            if starts_path {
                out.push_str(&text[last..found.start()]);
                last = found.end();
            }
        }
        out.push_str(&text[last..]);
        out
    }
}

/// Regex matching `base` plus a trailing separator, with either separator
/// style between segments.
fn embedded_pattern(base: &AbsolutePath) -> String {
    let mut pattern = match base.root {
        Root::Slash => String::from(r"[/\\]"),
        Root::Drive(drive) => format!(r"[{drive}{}]:[/\\]", drive.to_ascii_lowercase()),
    };
    let segments: Vec<String> = base.segments.iter().map(|s| regex::escape(s)).collect();
    pattern.push_str(&segments.join(r"[/\\]"));
    pattern.push_str(r"[/\\]");
    pattern
}

/// Rewrite `path` relative to `base_path`.
///
/// Convenience wrapper around [`PathRewriter::rewrite_path`].
#[must_use]
pub fn sanitize_path(path: &str, base_path: &str) -> String {
    PathRewriter::new(base_path).rewrite_path(path)
}

/// Rewrite base-path occurrences inside `text`.
///
/// Convenience wrapper around [`PathRewriter::rewrite_text`].
#[must_use]
pub fn sanitize_text(text: &str, base_path: &str) -> String {
    PathRewriter::new(base_path).rewrite_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_under_base_becomes_relative() {
        assert_eq!(sanitize_path("/base/proj/src/a.ts", "/base/proj"), "src/a.ts");
        assert_eq!(sanitize_path("/base/proj/src/a.ts", "/base/proj/"), "src/a.ts");
        assert_eq!(sanitize_path("/base/./proj//src/../lib", "/base/proj"), "lib");
    }

    #[test]
    fn test_equal_paths_become_dot() {
        assert_eq!(sanitize_path("/base/proj", "/base/proj"), ".");
        assert_eq!(sanitize_path("/base/proj/", "/base/proj"), ".");
    }

    #[test]
    fn test_paths_outside_base_are_unchanged() {
        assert_eq!(sanitize_path("/base/project2/a", "/base/proj"), "/base/project2/a");
        assert_eq!(sanitize_path("/etc/passwd", "/base/proj"), "/etc/passwd");
        assert_eq!(sanitize_path("/base/proj/../x", "/base/proj"), "/base/proj/../x");
    }

    #[test]
    fn test_empty_or_relative_base_is_a_no_op() {
        assert_eq!(sanitize_path("/base/proj/a", ""), "/base/proj/a");
        assert_eq!(sanitize_path("proj/a", "proj"), "proj/a");
        assert_eq!(sanitize_path("src/a.ts", "/base/proj"), "src/a.ts");
    }

    #[test]
    fn test_windows_paths() {
        assert_eq!(
            sanitize_path(r"C:\Users\me\proj\src\main.rs", r"c:\Users\me\proj"),
            r"src\main.rs"
        );
        assert_eq!(sanitize_path("C:/Users/me/proj", r"C:\Users\me\proj"), ".");
        assert_eq!(sanitize_path(r"D:\Users\me\proj\a", r"C:\Users\me\proj"), r"D:\Users\me\proj\a");
    }

    #[test]
    fn test_sanitize_path_is_idempotent() {
        let bases = ["/base/proj", "", "/", r"C:\work", "rel"];
        let paths = [
            "/base/proj/src/a.ts",
            "/base/proj",
            "/base/proj/proj/base/proj",
            "/other",
            "relative/path",
            ".",
            r"C:\work\x\y",
            "",
        ];
        for base in bases {
            for path in paths {
                let once = sanitize_path(path, base);
                assert_eq!(sanitize_path(&once, base), once, "path={path} base={base}");
            }
        }
    }

    #[test]
    fn test_embedded_paths_in_text() {
        let text = r#"/base/proj/src/a.ts contains api_key: "abcdef12345678""#;
        assert_eq!(
            sanitize_text(text, "/base/proj"),
            r#"src/a.ts contains api_key: "abcdef12345678""#
        );

        let text = "see /base/proj/lib/x.rs and \\base\\proj\\lib\\y.rs, not /base/proj2/z";
        assert_eq!(
            sanitize_text(text, "/base/proj"),
            "see lib/x.rs and lib\\y.rs, not /base/proj2/z"
        );
    }

    #[test]
    fn test_embedded_path_inside_longer_path_is_left_alone() {
        let text = "mounted at /mnt/base/proj/a and at /base/proj/b";
        assert_eq!(
            sanitize_text(text, "/base/proj"),
            "mounted at /mnt/base/proj/a and at b"
        );
    }

    #[test]
    fn test_text_that_is_a_single_path() {
        assert_eq!(sanitize_text("/base/proj", "/base/proj"), ".");
        assert_eq!(sanitize_text("/base/proj/a/b", "/base/proj"), "a/b");
        assert_eq!(sanitize_text("no paths here", "/base/proj"), "no paths here");
        assert_eq!(sanitize_text("/base/proj/a", ""), "/base/proj/a");
    }
}
