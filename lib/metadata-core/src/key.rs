//! Identity key construction for exported services

/// Joins a service key and a method name inside revision candidates
pub const METHOD_SEPARATOR: &str = "$";

pub const METHODS_KEY: &str = "methods";
pub const INTERFACE_KEY: &str = "interface";
pub const GROUP_KEY: &str = "group";
pub const VERSION_KEY: &str = "version";
pub const APPLICATION_KEY: &str = "application";

/// Parameters copied from a URL into a ServiceInfo
pub const INCLUDE_KEYS: &[&str] = &[
    APPLICATION_KEY,
    "cluster",
    GROUP_KEY,
    INTERFACE_KEY,
    "loadbalance",
    METHODS_KEY,
    "path",
    "release",
    "serialization",
    "timeout",
    "timestamp",
    "token",
    VERSION_KEY,
    "warmup",
    "weight",
];

// A version of "0.0.0" is the unversioned default and never appears in keys.
const DEFAULT_VERSION: &str = "0.0.0";

/// Build the canonical service key: `[group/]interface[:version]`
pub fn service_key(interface: &str, group: &str, version: &str) -> String {
    let mut key = String::with_capacity(group.len() + interface.len() + version.len() + 2);
    if !group.is_empty() {
        key.push_str(group);
        key.push('/');
    }
    key.push_str(interface);
    if !version.is_empty() && version != DEFAULT_VERSION {
        key.push(':');
        key.push_str(version);
    }
    key
}

/// Build the registry lookup key, qualifying the service key by protocol
pub fn match_key(service_key: &str, protocol: &str) -> String {
    if protocol.is_empty() {
        service_key.to_string()
    } else {
        format!("{}:{}", service_key, protocol)
    }
}

/// Split a raw `methods` value into method names.
///
/// The raw value carries a trailing `,` which is discarded. A value
/// without one (including an empty value) comes back as a single element.
pub fn split_methods(raw: &str) -> Vec<String> {
    let mut methods: Vec<String> = raw.split(',').map(str::to_string).collect();
    if methods.len() > 1 && methods.last().map_or(false, |m| m.is_empty()) {
        methods.pop();
    }
    methods
}
