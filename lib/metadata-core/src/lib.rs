//! Exported-service metadata and revision fingerprinting
//!
//! This library provides:
//! - Service descriptors with cached identity keys
//! - Application metadata holding the exported service set
//! - Deterministic revision calculation for change detection
//! - A lock-guarded handle for sharing metadata across tasks

pub mod endpoint;
pub mod config;
pub mod error;
pub mod key;
pub mod metadata;
pub mod registry;
pub mod revision;
pub mod service_info;

pub use config::ReportConfig;
pub use endpoint::ServiceUrl;
pub use error::{MetadataError, Result};
pub use metadata::MetadataInfo;
pub use registry::SharedMetadata;
pub use service_info::ServiceInfo;
