//! Shared, lock-guarded handle to an application's metadata

use crate::{MetadataInfo, ServiceInfo};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// SharedMetadata serializes access to a [`MetadataInfo`] across tasks.
///
/// Each operation holds the lock for its whole duration, so a revision is
/// always calculated over a consistent service set.
#[derive(Clone, Debug)]
pub struct SharedMetadata {
    inner: Arc<RwLock<MetadataInfo>>,
}

impl SharedMetadata {
    pub fn new(metadata: MetadataInfo) -> Self {
        Self {
            inner: Arc::new(RwLock::new(metadata)),
        }
    }

    /// Create an empty handle for an application
    pub fn with_app(app: impl Into<String>) -> Self {
        Self::new(MetadataInfo::with_app(app))
    }

    /// Register or replace a service
    pub async fn add_service(&self, info: Option<ServiceInfo>) {
        let mut metadata = self.inner.write().await;
        metadata.add_service(info);
    }

    /// Deregister a service
    pub async fn remove_service(&self, info: Option<&ServiceInfo>) {
        let mut metadata = self.inner.write().await;
        metadata.remove_service(info);
    }

    /// Current revision, calculated under the write lock since it is cached
    pub async fn revision(&self) -> String {
        let mut metadata = self.inner.write().await;
        let revision = metadata.cal_and_get_revision().to_string();
        debug!("Revision for app {} is {}", metadata.app, revision);
        revision
    }

    /// Calculate the revision, mark it reported and return a copy of the
    /// metadata it was calculated over, all under one write lock
    pub async fn report(&self) -> MetadataInfo {
        let mut metadata = self.inner.write().await;
        let revision = metadata.cal_and_get_revision().to_string();
        metadata.mark_reported();
        debug!("Reported revision {} for app {}", revision, metadata.app);
        metadata.clone()
    }

    pub async fn mark_reported(&self) {
        self.inner.write().await.mark_reported();
    }

    pub async fn has_reported(&self) -> bool {
        self.inner.read().await.has_reported()
    }

    pub async fn service_count(&self) -> usize {
        self.inner.read().await.service_count()
    }

    /// Owned copy of the metadata
    pub async fn snapshot(&self) -> MetadataInfo {
        self.inner.read().await.clone()
    }
}

impl Default for SharedMetadata {
    fn default() -> Self {
        Self::new(MetadataInfo::default())
    }
}
