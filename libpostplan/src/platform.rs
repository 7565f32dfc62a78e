//! Platform registry
//!
//! Platforms are data, not code: each entry maps a lowercase platform key
//! to its display name and content-length ceiling. The built-in table
//! covers twitter and linkedin; deployments add platforms through the
//! `[platforms.<name>]` config section without touching this module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;

pub const TWITTER: &str = "twitter";
pub const LINKEDIN: &str = "linkedin";

/// Per-platform constraints and presentation metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformSpec {
    pub display_name: String,
    pub max_content_length: usize,
}

/// Registry of platforms a post may target.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    specs: BTreeMap<String, PlatformSpec>,
}

impl PlatformRegistry {
    /// The built-in platform table.
    pub fn builtin() -> Self {
        let mut specs = BTreeMap::new();
        specs.insert(
            TWITTER.to_string(),
            PlatformSpec {
                display_name: "Twitter".to_string(),
                max_content_length: 280,
            },
        );
        specs.insert(
            LINKEDIN.to_string(),
            PlatformSpec {
                display_name: "LinkedIn".to_string(),
                max_content_length: 3000,
            },
        );
        Self { specs }
    }

    /// Built-in table merged with config-supplied entries. An override with
    /// a built-in key replaces that entry wholesale.
    pub fn with_overrides(overrides: &BTreeMap<String, PlatformSpec>) -> Self {
        let mut registry = Self::builtin();
        for (name, spec) in overrides {
            registry
                .specs
                .insert(name.to_lowercase(), spec.clone());
        }
        registry
    }

    pub fn insert(&mut self, name: &str, spec: PlatformSpec) {
        self.specs.insert(name.to_lowercase(), spec);
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.specs.contains_key(&platform.to_lowercase())
    }

    pub fn spec(&self, platform: &str) -> Result<&PlatformSpec, ValidationError> {
        self.specs
            .get(&platform.to_lowercase())
            .ok_or_else(|| ValidationError::UnsupportedPlatform(platform.to_string()))
    }

    pub fn max_content_length(&self, platform: &str) -> Result<usize, ValidationError> {
        Ok(self.spec(platform)?.max_content_length)
    }

    /// Platform keys in stable (alphabetical) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
