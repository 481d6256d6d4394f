//! Attribute values and the defaulting policy
//!
//! Raw element records come back from the page as loosely typed JSON. This
//! module normalizes them into [`Attributes`] and decides which values are the
//! platform default for their element and can be left out of a snapshot.

use crate::config::DefaultRules;
use crate::dom::path::Path;
use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix of keys the query script writes itself. `/` cannot occur in an
/// HTML attribute name, so these keys never collide with page attributes.
pub const SCRIPT_PREFIX: &str = "/";

/// Script key holding the element's tag
pub const SCRIPT_TAG_KEY: &str = "/tag";

/// Script key holding the element's 1-based position among all element siblings
pub const SCRIPT_POSITION_KEY: &str = "/position";

/// Plain record keys that may carry the tag when [`SCRIPT_TAG_KEY`] is absent
pub const TAG_KEYS: [&str; 2] = ["tagName", "tag"];

/// A single attribute value as observed on an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Filtered, ordered attribute set of one element
pub type Attributes = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    /// Convert a raw JSON value; `null` means the attribute is absent
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::Bool(b) => Some(AttributeValue::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or_default()),
            }),
            Value::String(s) => Some(AttributeValue::Text(s.clone())),
            other => Some(AttributeValue::Text(other.to_string())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is an empty string
    pub fn is_empty_text(&self) -> bool {
        matches!(self, AttributeValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

/// Decides whether an attribute value is the platform default for an element
pub trait DefaultValueFinder {
    fn is_default(&self, tag: &str, name: &str, value: &AttributeValue) -> bool;
}

impl DefaultValueFinder for DefaultRules {
    fn is_default(&self, tag: &str, name: &str, value: &AttributeValue) -> bool {
        if self.omit_empty && value.is_empty_text() {
            return true;
        }

        // tag-specific rules shadow the `all` rules
        let expected = self
            .tags
            .get(tag)
            .and_then(|rules| rules.get(name))
            .or_else(|| self.all.get(name));

        match expected {
            Some(default) => default.to_string() == value.to_string(),
            None => false,
        }
    }
}

/// Extract the tag and the typed attributes of one raw record
///
/// The tag comes from [`SCRIPT_TAG_KEY`], then `tagName`, then `tag`, and
/// falls back to the tag of the path's last step. Only the key the tag was
/// read from is consumed; the others stay attributes.
///
/// Script keys other than the tag and position become attributes without
/// their prefix and replace a page attribute of the same name, so `text`,
/// `shown`, `absolute-*` and computed CSS values always describe what the
/// page rendered.
pub fn normalize_record(
    path: &Path,
    record: &serde_json::Map<String, serde_json::Value>,
) -> Result<(String, Attributes)> {
    let recorded = std::iter::once(SCRIPT_TAG_KEY).chain(TAG_KEYS).find_map(|key| {
        record
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|tag| !tag.trim().is_empty())
            .map(|tag| (key, tag))
    });
    let tag_key = recorded.map(|(key, _)| key);

    let tag = recorded
        .map(|(_, tag)| tag)
        .or_else(|| path.tag())
        .map(|tag| tag.trim().to_ascii_lowercase())
        .ok_or_else(|| SnapshotError::MissingTag(path.to_string()))?;

    let mut attributes = Attributes::new();
    let mut computed = Vec::new();

    for (name, value) in record {
        if Some(name.as_str()) == tag_key || name == SCRIPT_TAG_KEY || name == SCRIPT_POSITION_KEY {
            continue;
        }
        let Some(value) = AttributeValue::from_json(value) else {
            continue;
        };
        match name.strip_prefix(SCRIPT_PREFIX) {
            Some("") => {}
            Some(computed_name) => computed.push((computed_name.to_string(), value)),
            None => {
                attributes.insert(name.clone(), value);
            }
        }
    }
    attributes.extend(computed);

    Ok((tag, attributes))
}

/// Drop every attribute the policy considers a default for `tag`
pub fn strip_defaults(tag: &str, attributes: Attributes, policy: &dyn DefaultValueFinder) -> Attributes {
    attributes
        .into_iter()
        .filter(|(name, value)| !policy.is_default(tag, name, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules() -> DefaultRules {
        let mut rules = DefaultRules::default();
        rules.omit_empty = true;
        rules.all.insert("display".into(), "inline".into());
        rules.all.insert("opacity".into(), AttributeValue::Integer(1));
        let mut div = BTreeMap::new();
        div.insert("display".into(), "block".into());
        rules.tags.insert("div".into(), div);
        rules
    }

    #[test]
    fn test_from_json() {
        assert_eq!(AttributeValue::from_json(&json!(null)), None);
        assert_eq!(AttributeValue::from_json(&json!(true)), Some(AttributeValue::Bool(true)));
        assert_eq!(AttributeValue::from_json(&json!(12)), Some(AttributeValue::Integer(12)));
        assert_eq!(AttributeValue::from_json(&json!(0.5)), Some(AttributeValue::Float(0.5)));
        assert_eq!(AttributeValue::from_json(&json!("x")), Some("x".into()));
        assert_eq!(AttributeValue::from_json(&json!([1, 2])), Some("[1,2]".into()));
    }

    #[test]
    fn test_tag_rules_shadow_all() {
        let rules = rules();
        assert!(rules.is_default("div", "display", &"block".into()));
        assert!(!rules.is_default("div", "display", &"inline".into()));
        assert!(rules.is_default("span", "display", &"inline".into()));
        assert!(!rules.is_default("span", "display", &"block".into()));
    }

    #[test]
    fn test_compares_textual_form() {
        let rules = rules();
        assert!(rules.is_default("p", "opacity", &"1".into()));
        assert!(rules.is_default("p", "opacity", &AttributeValue::Integer(1)));
        assert!(!rules.is_default("p", "opacity", &"0.5".into()));
    }

    #[test]
    fn test_empty_values() {
        let mut rules = rules();
        assert!(rules.is_default("p", "class", &"".into()));
        rules.omit_empty = false;
        assert!(!rules.is_default("p", "class", &"".into()));
    }

    #[test]
    fn test_normalize_record() {
        let path: Path = "/html[1]/body[1]".parse().unwrap();
        let record = json!({"tagName": "BODY", "class": "main", "hidden": null, "shown": true});
        let (tag, attributes) = normalize_record(&path, record.as_object().unwrap()).unwrap();

        assert_eq!(tag, "body");
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes["class"], "main".into());
        assert_eq!(attributes["shown"], AttributeValue::Bool(true));
    }

    #[test]
    fn test_normalize_record_tag_fallback() {
        let tagged: Path = "/html[1]/body[1]/p[3]".parse().unwrap();
        let (tag, _) = normalize_record(&tagged, json!({}).as_object().unwrap()).unwrap();
        assert_eq!(tag, "p");

        let positional: Path = "/0/1".parse().unwrap();
        let err = normalize_record(&positional, json!({"class": "x"}).as_object().unwrap()).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingTag(p) if p == "/0/1"));
    }

    #[test]
    fn test_tag_attribute_kept_when_tag_name_present() {
        let path: Path = "/html[1]/body[1]/x-badge[1]".parse().unwrap();
        let record = json!({"tagName": "x-badge", "tag": "v1.2"});
        let (tag, attributes) = normalize_record(&path, record.as_object().unwrap()).unwrap();

        assert_eq!(tag, "x-badge");
        assert_eq!(attributes.get("tag"), Some(&"v1.2".into()));
        assert!(!attributes.contains_key("tagName"));
    }

    #[test]
    fn test_script_tag_key_leaves_page_attributes() {
        let path: Path = "/html[1]/body[1]/div[1]".parse().unwrap();
        let record = json!({"/tag": "DIV", "/position": 3, "tag": "beta", "tagname": "x"});
        let (tag, attributes) = normalize_record(&path, record.as_object().unwrap()).unwrap();

        assert_eq!(tag, "div");
        assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["tag", "tagname"]);
    }

    #[test]
    fn test_script_values_shadow_page_attributes() {
        let path: Path = "/html[1]/body[1]/img[1]".parse().unwrap();
        let record = json!({
            "/tag": "img",
            "width": "100",
            "/width": "120px",
            "text": "page text",
            "/text": "rendered",
            "/shown": true,
            "/absolute-x": 8,
            "/": "ignored",
            "alt": "logo"
        });
        let (_, attributes) = normalize_record(&path, record.as_object().unwrap()).unwrap();

        assert_eq!(attributes["width"], "120px".into());
        assert_eq!(attributes["text"], "rendered".into());
        assert_eq!(attributes["shown"], AttributeValue::Bool(true));
        assert_eq!(attributes["absolute-x"], AttributeValue::Integer(8));
        assert_eq!(attributes["alt"], "logo".into());
        assert!(attributes.keys().all(|name| !name.starts_with(SCRIPT_PREFIX)));
        assert_eq!(attributes.len(), 5);
    }

    #[test]
    fn test_strip_defaults() {
        let mut attributes = Attributes::new();
        attributes.insert("display".into(), "block".into());
        attributes.insert("class".into(), "x".into());
        attributes.insert("title".into(), "".into());

        let stripped = strip_defaults("div", attributes, &rules());
        assert_eq!(stripped.keys().collect::<Vec<_>>(), vec!["class"]);
    }
}
