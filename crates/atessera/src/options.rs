//! Engine options.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One optional piece of syntax or rendering behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// `***[key]alt***comment` blocks
    AnnotatedImages,
    /// `***[#ref]text` blocks and `[#ref]` spans
    Citations,
    /// `@@ label @@` containers
    Labels,
    /// `$$expr$$` blocks and `[$expr]` spans
    Math,
    /// `[@key]` and `[@@key]` spans
    References,
    /// Typographic digraphs (`--`, `<<`, `~`, ...) in hypertext output
    ExtChars,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::AnnotatedImages,
        Feature::Citations,
        Feature::Labels,
        Feature::Math,
        Feature::References,
        Feature::ExtChars,
    ];
}

/// A set of enabled [`Feature`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(BTreeSet<Feature>);

impl Features {
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn all() -> Self {
        Self(Feature::ALL.into_iter().collect())
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.0.insert(feature);
        self
    }

    pub fn without(mut self, feature: Feature) -> Self {
        self.0.remove(&feature);
        self
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }
}

/// Every syntax feature, without `ext_chars`.
impl Default for Features {
    fn default() -> Self {
        Self::all().without(Feature::ExtChars)
    }
}

impl FromIterator<Feature> for Features {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Options shared by both render engines.
///
/// Can be loaded from YAML:
///
/// ```yaml
/// features: [annotated_images, citations, math, ext_chars]
/// allow_inline_html: true
/// strip_newlines: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub features: Features,

    /// Recognise inline raw HTML. When off, inline tags are plain text.
    pub allow_inline_html: bool,

    /// Typesetting only: collapse soft line breaks into spaces.
    pub strip_newlines: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features = self.features.with(feature);
        self
    }

    pub fn without_feature(mut self, feature: Feature) -> Self {
        self.features = self.features.without(feature);
        self
    }

    pub fn with_inline_html(mut self, allow: bool) -> Self {
        self.allow_inline_html = allow;
        self
    }

    pub fn with_strip_newlines(mut self, strip: bool) -> Self {
        self.strip_newlines = strip;
        self
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }
}
