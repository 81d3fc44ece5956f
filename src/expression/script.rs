//! Scripts evaluated by the search backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where the code of a [`Script`] comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptSource {
    /// Inline script code.
    #[serde(rename = "source")]
    Inline(String),
    /// Identifier of a script stored in the backend.
    #[serde(rename = "id")]
    Stored(String),
}

/// A backend script with its language, options and parameters.
///
/// Serializes to the backend's script object, e.g.
/// `{"source": "doc['x'].value * params.f", "lang": "painless", "params": {"f": 2}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(flatten)]
    pub source: ScriptSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl Script {
    pub fn inline(source: impl Into<String>) -> Self {
        Script::new(ScriptSource::Inline(source.into()))
    }

    pub fn stored(id: impl Into<String>) -> Self {
        Script::new(ScriptSource::Stored(id.into()))
    }

    fn new(source: ScriptSource) -> Self {
        Script {
            source,
            lang: None,
            options: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
