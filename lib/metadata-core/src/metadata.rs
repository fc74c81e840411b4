//! Application metadata: the exported services and their revision

use crate::endpoint::ServiceUrl;
use crate::revision;
use crate::service_info::ServiceInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// MetadataInfo holds every service an application instance exports,
/// keyed by match key, along with the revision fingerprint of that set.
///
/// Not synchronized; wrap it in [`crate::SharedMetadata`] when shared.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MetadataInfo {
    pub app: String,
    /// Cached revision, empty until first calculated
    #[serde(default)]
    pub revision: String,
    /// The cached revision was already published and is authoritative
    #[serde(skip)]
    pub reported: bool,
    #[serde(default)]
    services: HashMap<String, ServiceInfo>,
}

impl MetadataInfo {
    /// Create metadata for an application with no services
    pub fn with_app(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            ..Default::default()
        }
    }

    /// Create metadata with an initial revision and service map
    pub fn new(
        app: impl Into<String>,
        revision: impl Into<String>,
        services: HashMap<String, ServiceInfo>,
    ) -> Self {
        Self {
            app: app.into(),
            revision: revision.into(),
            reported: false,
            services,
        }
    }

    /// Return the revision, recalculating it unless it was already reported
    pub fn cal_and_get_revision(&mut self) -> &str {
        if self.reported && !self.revision.is_empty() {
            return &self.revision;
        }

        self.revision = revision::calculate(self.services.values());
        debug!(
            "Calculated revision {} for app {} over {} services",
            self.revision,
            self.app,
            self.services.len()
        );
        &self.revision
    }

    /// Insert or replace a service under its match key. `None` is ignored.
    pub fn add_service(&mut self, info: Option<ServiceInfo>) {
        let Some(info) = info else {
            return;
        };

        let match_key = info.match_key().to_string();
        debug!("Adding service {} to app {}", match_key, self.app);
        self.services.insert(match_key, info);
        self.reported = false;
    }

    /// Remove the service stored under the given service's match key.
    /// `None` and unknown keys are ignored.
    pub fn remove_service(&mut self, info: Option<&ServiceInfo>) {
        let Some(info) = info else {
            return;
        };

        if self.services.remove(info.match_key()).is_some() {
            debug!("Removed service {} from app {}", info.match_key(), self.app);
            self.reported = false;
        }
    }

    /// Record that the current revision has been published
    pub fn mark_reported(&mut self) {
        self.reported = true;
    }

    pub fn has_reported(&self) -> bool {
        self.reported
    }

    /// Look up a service by match key
    pub fn get_service(&self, match_key: &str) -> Option<&ServiceInfo> {
        self.services.get(match_key)
    }

    /// Iterate over services by match key without allowing structural changes
    pub fn services(&self) -> impl Iterator<Item = (&String, &ServiceInfo)> {
        self.services.iter()
    }

    /// Owned copy of the service map
    pub fn service_snapshot(&self) -> HashMap<String, ServiceInfo> {
        self.services.clone()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Drop every service
    pub fn clear_services(&mut self) {
        if !self.services.is_empty() {
            debug!("Cleared {} services from app {}", self.services.len(), self.app);
            self.services.clear();
            self.reported = false;
        }
    }

    /// URLs of services that were built from a URL, sorted by their rendered form
    pub fn exported_urls(&self) -> Vec<ServiceUrl> {
        let mut urls: Vec<ServiceUrl> = self
            .services
            .values()
            .filter_map(|s| s.url().cloned())
            .collect();
        urls.sort_by_cached_key(|u| u.to_string());
        urls
    }
}
