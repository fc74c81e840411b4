//! Exported service descriptor with lazily derived identity keys

use crate::endpoint::ServiceUrl;
use crate::key::{self, INCLUDE_KEYS, METHODS_KEY};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// ServiceInfo describes one service exported by an application instance.
///
/// The service key and match key are computed from the identity fields on
/// first access and cached; later edits to those fields do not change them
/// until [`ServiceInfo::reset_keys`] is called.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub group: String,
    pub version: String,
    pub protocol: String,
    pub path: String,
    #[serde(default)]
    params: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    service_key: OnceCell<String>,
    #[serde(skip)]
    match_key: OnceCell<String>,
    #[serde(skip)]
    url: Option<Arc<ServiceUrl>>,
}

impl ServiceInfo {
    /// Create a service descriptor from identity fields and single-valued params
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        version: impl Into<String>,
        protocol: impl Into<String>,
        path: impl Into<String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            version: version.into(),
            protocol: protocol.into(),
            path: path.into(),
            params: params.into_iter().map(|(k, v)| (k, vec![v])).collect(),
            ..Default::default()
        }
    }

    /// Create a service descriptor from an exported URL, keeping only the
    /// parameters relevant to service metadata
    pub fn from_url(url: &ServiceUrl) -> Self {
        let mut params = BTreeMap::new();
        for name in INCLUDE_KEYS {
            let values: Vec<String> = url
                .get_params(name)
                .iter()
                .filter(|v| !v.is_empty())
                .cloned()
                .collect();
            if !values.is_empty() {
                params.insert(name.to_string(), values);
            }
        }

        Self {
            name: url.service().to_string(),
            group: url.group().to_string(),
            version: url.version().to_string(),
            protocol: url.protocol().to_string(),
            path: url.path().to_string(),
            params,
            url: Some(Arc::new(url.clone())),
            ..Default::default()
        }
    }

    /// Canonical service identity, computed once from name/group/version
    pub fn service_key(&self) -> &str {
        self.service_key
            .get_or_init(|| key::service_key(&self.name, &self.group, &self.version))
    }

    /// Registry lookup key, computed once from the service key and protocol
    pub fn match_key(&self) -> &str {
        self.match_key
            .get_or_init(|| key::match_key(self.service_key(), &self.protocol))
    }

    /// Drop both cached keys so they are recomputed on next access
    pub fn reset_keys(&mut self) {
        self.service_key.take();
        self.match_key.take();
    }

    /// Method names from the `methods` parameter, see [`key::split_methods`]
    pub fn methods(&self) -> Vec<String> {
        key::split_methods(self.param(METHODS_KEY).unwrap_or(""))
    }

    /// First value of a parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }

    pub fn params(&self) -> &BTreeMap<String, Vec<String>> {
        &self.params
    }

    /// Replace all values of a parameter
    pub fn set_param(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.params.insert(name.into(), values);
    }

    /// The URL this descriptor was built from, if any
    pub fn url(&self) -> Option<&ServiceUrl> {
        self.url.as_deref()
    }
}

impl PartialEq for ServiceInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.group == other.group
            && self.version == other.version
            && self.protocol == other.protocol
            && self.path == other.path
            && self.params == other.params
    }
}

impl Eq for ServiceInfo {}
