use regex::{escape as re_escape, Regex, RegexBuilder};

use crate::error::TreeError;

/// Escape markup so a remote-supplied value is safe to display verbatim.
pub fn escape_tags(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Resolve backslash escapes left inside a quoted property value (`\"` -> `"`, `\\` -> `\`).
pub fn unescape_quoted(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => res.push(escaped),
                None => res.push(c),
            }
        } else {
            res.push(c);
        }
    }
    res
}

/// Turn a node name into a fragment usable inside a node id.
///
/// Distinct names may collapse onto the same fragment; the forest disambiguates the resulting ids.
pub fn to_id_segment(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Compile a `*`-wildcard pattern into an anchored, case-insensitive regex.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, TreeError> {
    let body = pattern
        .split('*')
        .map(re_escape)
        .collect::<Vec<_>>()
        .join(".*");
    Ok(RegexBuilder::new(&format!("^{body}$"))
        .unicode(true)
        .case_insensitive(true)
        .build()?)
}

/// A `*`-wildcard pattern compiled once for matching against many names. Patterns without a
/// wildcard skip the regex engine.
#[derive(Debug, Clone)]
pub enum Glob {
    /// Lowercased pattern text.
    Exact(String),
    Pattern(Regex),
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Glob, TreeError> {
        if pattern.contains('*') {
            Ok(Glob::Pattern(glob_to_regex(pattern)?))
        } else {
            Ok(Glob::Exact(pattern.to_lowercase()))
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Glob::Exact(lowered) => text.to_lowercase() == *lowered,
            Glob::Pattern(regex) => regex.is_match(text),
        }
    }
}

/// Compile a `key -> pattern` criteria map, as taken by
/// [crate::tree::NodeRef::matches_compiled].
pub fn compile_criteria<'a, I>(criteria: I) -> Result<Vec<(String, Glob)>, TreeError>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    criteria
        .into_iter()
        .map(|(key, pattern)| Ok((key.clone(), Glob::new(pattern)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_escape_tags() {
        assert_eq!(escape_tags("<b>bold</b>"), "&lt;b&gt;bold&lt;/b&gt;");
        assert_eq!(escape_tags("plain"), "plain");
    }

    #[test]
    fn test_unescape_quoted() {
        assert_eq!(unescape_quoted(r#"say \"hi\""#), r#"say "hi""#);
        assert_eq!(unescape_quoted(r"a\\b"), r"a\b");
        assert_eq!(unescape_quoted(r"trailing\"), r"trailing\");
    }

    #[test]
    fn test_to_id_segment() {
        assert_eq!(to_id_segment("my route"), "my_route");
        assert_eq!(to_id_segment("a.b-c_d"), "a.b-c_d");
        assert_eq!(to_id_segment("x,y=z"), "x_y_z");
    }

    fn glob_match(pattern: &str, text: &str) -> bool {
        Glob::new(pattern).unwrap().is_match(text)
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("route*", "Route1"));
        assert!(glob_match("*", ""));
        assert!(glob_match("a.b", "A.B"));
        assert!(!glob_match("a.b", "axb"));
        assert!(!glob_match("route", "route1"));
        assert!(glob_match("*(1)*", "x(1)y"));
    }

    #[test]
    fn test_glob_without_wildcard_skips_the_regex() {
        let exact = Glob::new("Eden Space").unwrap();
        assert!(matches!(exact, Glob::Exact(_)));
        assert!(exact.is_match("eden space"));
        assert!(!exact.is_match("eden space 2"));

        let wild = Glob::new("eden*").unwrap();
        assert!(matches!(wild, Glob::Pattern(_)));
        assert!(wild.is_match("Eden Space"));
        assert!(wild.is_match("EDEN"));
        assert!(!wild.is_match("old eden"));
    }

    #[test]
    fn test_compile_criteria() {
        let criteria = [("name".to_string(), "r*".to_string())]
            .into_iter()
            .collect::<std::collections::BTreeMap<_, _>>();
        let compiled = compile_criteria(&criteria).unwrap();
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].0, "name");
        assert!(compiled[0].1.is_match("Route"));
    }
}
