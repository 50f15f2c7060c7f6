//! Tokenizing of managed-object property lists into tree paths.
//!
//! A property list is the `key=value,key=value` part of an object name. Values may be quoted
//! and quoted values may contain commas, so tokens are matched with a pattern that tries the
//! quoted alternatives (double, single, backslash-escaped double) before the bare one.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    config::TreeConfig,
    paths::path::{escape_tags, unescape_quoted},
};

static PROPERTY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<key>[^,=]+)=(?:"(?P<dq>(?:\\.|[^"\\])*)"|'(?P<sq>(?:\\.|[^'\\])*)'|\\"(?P<eq>.*?)\\"|(?P<bare>[^,]*))"#,
    )
    .expect("property list pattern to compile")
});

pub const TYPE_KEY: &str = "type";
pub const NAME_KEY: &str = "name";
pub const SERVICE_KEY: &str = "service";

fn token_value(caps: &Captures<'_>) -> String {
    let raw = if let Some(quoted) = caps
        .name("dq")
        .or_else(|| caps.name("sq"))
        .or_else(|| caps.name("eq"))
    {
        unescape_quoted(quoted.as_str())
    } else {
        caps.name("bare")
            .map(|bare| bare.as_str().to_string())
            .unwrap_or_default()
    };
    escape_tags(&raw)
}

/// A parsed property list with its path precedence applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyList {
    domain: String,
    raw: String,
    entries: Vec<(String, String)>,
    type_name: Option<String>,
    service_name: Option<String>,
}

impl PropertyList {
    /// Parse `raw` as it appears under `domain`.
    ///
    /// `root_has_child` reports whether the domain root already holds a child (of either kind)
    /// with the given name; a `type` value that does is promoted to the front of the path.
    pub fn parse<F>(domain: &str, raw: &str, root_has_child: F, config: &TreeConfig) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let mut list = PropertyList {
            domain: domain.to_string(),
            raw: raw.to_string(),
            entries: Vec::new(),
            type_name: None,
            service_name: None,
        };

        for caps in PROPERTY_PATTERN.captures_iter(raw) {
            let key = caps["key"].trim().to_string();
            let value = token_value(&caps);

            if key.eq_ignore_ascii_case(TYPE_KEY) {
                list.type_name = Some(value.clone());
            } else if key.eq_ignore_ascii_case(SERVICE_KEY) {
                list.service_name = Some(value.clone());
            }

            // Later duplicates overwrite the value but keep the first position
            if let Some(existing) = list.entries.iter_mut().find(|(k, _)| *k == key) {
                tracing::debug!("Duplicate key '{key}' in property list '{raw}'");
                existing.1 = value;
                continue;
            }

            if key.eq_ignore_ascii_case(TYPE_KEY) {
                if root_has_child(&value) {
                    list.entries.insert(0, (key, value));
                } else if let Some(name_idx) =
                    list.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(NAME_KEY))
                {
                    list.entries.insert(name_idx, (key, value));
                } else {
                    list.entries.push((key, value));
                }
            } else {
                list.entries.push((key, value));
            }
        }

        if let Some(order) = config.reorder_for(domain) {
            list.move_to_front(order);
        }
        list
    }

    fn move_to_front(&mut self, keys: &[String]) {
        let mut front = Vec::with_capacity(self.entries.len());
        for key in keys {
            if let Some(idx) = self
                .entries
                .iter()
                .position(|(k, _)| k.eq_ignore_ascii_case(key))
            {
                front.push(self.entries.remove(idx));
            }
        }
        front.append(&mut self.entries);
        self.entries = front;
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The resolved path segments, in final order.
    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// The full object name, `domain:raw-property-list`.
    pub fn object_name(&self) -> String {
        format!("{}:{}", self.domain, self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn parse(domain: &str, raw: &str) -> PropertyList {
        PropertyList::parse(domain, raw, |_| false, &TreeConfig::default())
    }

    #[test]
    fn test_plain_tokens_keep_order() {
        let list = parse("java.lang", "type=MemoryPool,name=Metaspace");
        assert_eq!(list.paths(), vec!["MemoryPool", "Metaspace"]);
        assert_eq!(list.type_name(), Some("MemoryPool"));
        assert_eq!(list.object_name(), "java.lang:type=MemoryPool,name=Metaspace");
    }

    #[test]
    fn test_quoted_values_may_hold_commas() {
        let list = parse(
            "org.apache.camel",
            r#"context=ctx,type=routes,name="a,b",desc='x,y',plain=z"#,
        );
        assert_eq!(list.paths(), vec!["ctx", "routes", "a,b", "x,y", "z"]);
    }

    #[test]
    fn test_escaped_quotes_and_tags() {
        let list = parse("d", r#"k=\"v1,v2\",name="<b>\"bold\"</b>""#);
        assert_eq!(list.get("k"), Some("v1,v2"));
        assert_eq!(list.get("name"), Some("&lt;b&gt;\"bold\"&lt;/b&gt;"));
    }

    #[test]
    fn test_type_inserted_before_seen_name() {
        let list = parse("d", "context=A,name=n,type=routes");
        assert_eq!(list.paths(), vec!["A", "routes", "n"]);
    }

    #[test]
    fn test_type_promoted_when_root_has_it() {
        let list = PropertyList::parse(
            "d",
            "context=A,name=n,Type=routes",
            |name| name == "routes",
            &TreeConfig::default(),
        );
        assert_eq!(list.paths(), vec!["routes", "A", "n"]);
    }

    #[test]
    fn test_well_known_keys_ignore_case() {
        let list = parse("d", "context=A,Name=n,TYPE=routes");
        assert_eq!(list.paths(), vec!["A", "routes", "n"]);

        let list = parse("d", "a=1,Service=svc");
        assert_eq!(list.service_name(), Some("svc"));

        let list = parse("osgi.core", "Framework=fw,UUID=u,Version=1.5,type=bundleState");
        assert_eq!(list.paths(), vec!["bundleState", "1.5", "fw", "u"]);
    }

    #[test]
    fn test_service_is_remembered_in_place() {
        let list = parse("d", "a=1,service=svc,b=2");
        assert_eq!(list.service_name(), Some("svc"));
        assert_eq!(list.paths(), vec!["1", "svc", "2"]);
    }

    #[test]
    fn test_special_domain_reorder() {
        let list = parse(
            "osgi.compendium",
            "framework=fw,uuid=u,version=1.7,service=cm",
        );
        assert_eq!(list.paths(), vec!["cm", "1.7", "fw", "u"]);

        let list = parse("osgi.core", "framework=fw,uuid=u,version=1.5,type=bundleState");
        assert_eq!(list.paths(), vec!["bundleState", "1.5", "fw", "u"]);

        // Other domains are untouched
        let list = parse("other", "framework=fw,version=1,service=cm");
        assert_eq!(list.paths(), vec!["fw", "1", "cm"]);
    }

    #[test]
    fn test_duplicate_key_last_value_first_position() {
        let list = parse("d", "a=1,b=2,a=3");
        assert_eq!(list.paths(), vec!["3", "2"]);
        assert_eq!(list.entries().len(), 2);
    }

    #[test]
    fn test_empty_list_is_empty_path() {
        let list = parse("d", "");
        assert!(list.is_empty());
        assert!(list.paths().is_empty());
        assert_eq!(list.object_name(), "d:");
    }

    #[test]
    fn test_n_tokens_yield_n_values() {
        let raw = (0..12)
            .map(|i| format!("k{i}=v{i}"))
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(parse("d", &raw).paths().len(), 12);
    }
}
