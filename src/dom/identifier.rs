//! Stable element identifiers
//!
//! Identifiers are derived from an element's tag and its identity-relevant
//! attributes, never from its path, so they survive siblings being added or
//! removed elsewhere on the page.

use crate::config::IdentityConfig;
use crate::dom::attributes::Attributes;
use sha1::{Digest, Sha1};
use std::collections::HashMap;

/// Computes identifiers for converted elements
pub trait IdProvider: Send + Sync {
    /// Identifier for an element with the given tag and filtered attributes
    fn id_for(&self, tag: &str, attributes: &Attributes) -> String;

    /// Identifier for the `occurrence`-th (1-based, > 1) sibling sharing `base`
    fn disambiguate(&self, base: &str, occurrence: usize) -> String {
        format!("{}-{}", base, occurrence)
    }
}

/// `<tag>-<sha1 prefix>` identifiers over the configured identity attributes
#[derive(Debug, Clone)]
pub struct HashIdProvider {
    attributes: Vec<String>,
    hash_length: usize,
}

impl HashIdProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        let mut attributes = config.attributes.clone();
        attributes.sort();
        attributes.dedup();

        Self {
            attributes,
            hash_length: config.hash_length.clamp(4, 40),
        }
    }

    fn fingerprint(&self, tag: &str, attributes: &Attributes) -> String {
        let mut hasher = Sha1::new();
        hasher.update(tag.as_bytes());

        for name in &self.attributes {
            if let Some(value) = attributes.get(name) {
                hasher.update(b"\n");
                hasher.update(name.as_bytes());
                hasher.update(b"=");
                hasher.update(value.to_string().as_bytes());
            }
        }

        let digest = format!("{:x}", hasher.finalize());
        digest[..self.hash_length].to_string()
    }
}

impl Default for HashIdProvider {
    fn default() -> Self {
        Self::new(&IdentityConfig::default())
    }
}

impl IdProvider for HashIdProvider {
    fn id_for(&self, tag: &str, attributes: &Attributes) -> String {
        format!("{}-{}", sanitize_tag(tag), self.fingerprint(tag, attributes))
    }
}

fn sanitize_tag(tag: &str) -> String {
    let cleaned: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();

    if cleaned.is_empty() { "element".to_string() } else { cleaned }
}

/// Make identifiers unique among one parent's children
///
/// The first element keeps its identifier; later ones sharing it get the
/// provider's disambiguated form in sibling order.
pub fn disambiguate_siblings(ids: &mut [String], provider: &dyn IdProvider) {
    let mut seen: HashMap<String, usize> = HashMap::new();

    for id in ids.iter_mut() {
        let count = seen.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            *id = provider.disambiguate(id, *count);
        }
    }
}
