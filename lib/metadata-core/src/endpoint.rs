//! Service URL describing one exported endpoint
use crate::key::{self, GROUP_KEY, INTERFACE_KEY, METHODS_KEY, VERSION_KEY};
use crate::{MetadataError, Result};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// ServiceUrl is an immutable-by-default view of `protocol://host:port/path?params`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceUrl {
    protocol: String,
    ip: String,
    port: Option<u16>,
    path: String,
    // Multi-valued, in order of appearance
    params: BTreeMap<String, Vec<String>>,
}

impl ServiceUrl {
    /// Parse a service URL, percent-decoding its query parameters
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)?;

        let ip = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| MetadataError::InvalidUrl(format!("missing host in {}", raw)))?
            .to_string();

        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            params
                .entry(key.into_owned())
                .or_insert_with(Vec::new)
                .push(value.into_owned());
        }

        Ok(Self {
            protocol: url.scheme().to_string(),
            ip,
            port: url.port(),
            path: url.path().trim_start_matches('/').to_string(),
            params,
        })
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Host and port as `ip:port` (just `ip` when no port was given)
    pub fn location(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.ip, port),
            None => self.ip.clone(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The service interface name, falling back to the URL path
    pub fn service(&self) -> &str {
        match self.param(INTERFACE_KEY) {
            Some(interface) if !interface.is_empty() => interface,
            _ => &self.path,
        }
    }

    pub fn group(&self) -> &str {
        self.param(GROUP_KEY).unwrap_or("")
    }

    pub fn version(&self) -> &str {
        self.param(VERSION_KEY).unwrap_or("")
    }

    /// First value of a parameter, or `default` when absent
    pub fn get_param(&self, name: &str, default: &str) -> String {
        self.param(name).unwrap_or(default).to_string()
    }

    /// All values of a parameter
    pub fn get_params(&self, name: &str) -> &[String] {
        self.params.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Method names listed in the `methods` parameter, parsed the same way
    /// as [`crate::ServiceInfo::methods`]
    pub fn methods(&self) -> Vec<String> {
        key::split_methods(self.param(METHODS_KEY).unwrap_or(""))
    }

    /// Iterate over parameter names and their values
    pub fn params(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.params.iter()
    }

    /// Append a value to a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .entry(name.into())
            .or_insert_with(Vec::new)
            .push(value.into());
        self
    }

    /// Replace the `methods` parameter; every name is followed by a `,`
    pub fn set_methods<I, S>(&mut self, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: String = methods
            .into_iter()
            .map(|m| format!("{},", m.as_ref()))
            .collect();
        self.params.insert(METHODS_KEY.to_string(), vec![joined]);
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.protocol, self.location(), self.path)?;
        if !self.params.is_empty() {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (name, values) in &self.params {
                for value in values {
                    query.append_pair(name, value);
                }
            }
            write!(f, "?{}", query.finish())?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ServiceUrl {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_PROVIDER: &str = "dubbo://127.0.0.1:20000/com.ikurento.user.UserProvider?anyhost=true&\
        application=BDTService&category=providers&default.timeout=10000&\
        interface=com.ikurento.user.UserProvider&methods=GetUser%2C&\
        module=dubbogo+user-info+server&side=provider&timeout=3000";

    #[test]
    fn test_parse_identity() {
        let url = ServiceUrl::parse(USER_PROVIDER).unwrap();
        assert_eq!(url.protocol(), "dubbo");
        assert_eq!(url.ip(), "127.0.0.1");
        assert_eq!(url.port(), Some(20000));
        assert_eq!(url.location(), "127.0.0.1:20000");
        assert_eq!(url.path(), "com.ikurento.user.UserProvider");
        assert_eq!(url.service(), "com.ikurento.user.UserProvider");
        assert_eq!(url.group(), "");
        assert_eq!(url.version(), "");
    }

    #[test]
    fn test_parse_decodes_params() {
        let url = ServiceUrl::parse(USER_PROVIDER).unwrap();
        assert_eq!(url.get_param("methods", ""), "GetUser,");
        assert_eq!(url.get_param("module", ""), "dubbogo user-info server");
        assert_eq!(url.get_param("missing", "fallback"), "fallback");
        assert_eq!(url.methods(), vec!["GetUser".to_string()]);
    }

    #[test]
    fn test_multi_valued_params() {
        let url = ServiceUrl::parse("tri://10.0.0.1:50051/Greeter?tag=a&tag=b").unwrap();
        assert_eq!(url.get_params("tag"), &["a".to_string(), "b".to_string()]);
        assert_eq!(url.get_param("tag", ""), "a");
        assert!(url.get_params("none").is_empty());
    }

    #[test]
    fn test_methods_match_service_info() {
        use crate::ServiceInfo;

        let raws = [
            "dubbo://127.0.0.1:20000/com.x.Foo?methods=GetUser%2C",
            "dubbo://127.0.0.1:20000/com.x.Foo?methods=GetUser",
            "dubbo://127.0.0.1:20000/com.x.Foo?methods=",
            "dubbo://127.0.0.1:20000/com.x.Foo",
        ];
        for raw in raws {
            let url = ServiceUrl::parse(raw).unwrap();
            let mut info = ServiceInfo::from_url(&url);
            // from_url drops empty values, so carry the raw one over
            info.set_param("methods", vec![url.get_param("methods", "")]);
            assert_eq!(url.methods(), info.methods(), "{}", raw);
        }
        let url = ServiceUrl::parse(raws[3]).unwrap();
        assert_eq!(url.methods(), vec![""]);
    }

    #[test]
    fn test_service_falls_back_to_path() {
        let url = ServiceUrl::parse("tri://10.0.0.1:50051/helloworld.Greeter").unwrap();
        assert_eq!(url.service(), "helloworld.Greeter");
    }

    #[test]
    fn test_missing_host_rejected() {
        assert!(matches!(
            ServiceUrl::parse("dubbo:com.x.Foo"),
            Err(MetadataError::InvalidUrl(_))
        ));
        assert!(matches!(
            ServiceUrl::parse("not a url"),
            Err(MetadataError::UrlParse(_))
        ));
    }

    #[test]
    fn test_set_methods_and_display() {
        let mut url = ServiceUrl::parse("dubbo://127.0.0.1:20000/com.x.Foo")
            .unwrap()
            .with_param("group", "g1");
        url.set_methods(["bar", "baz"]);
        assert_eq!(url.get_param("methods", ""), "bar,baz,");
        assert_eq!(url.methods(), vec!["bar".to_string(), "baz".to_string()]);

        let rendered = url.to_string();
        assert_eq!(
            rendered,
            "dubbo://127.0.0.1:20000/com.x.Foo?group=g1&methods=bar%2Cbaz%2C"
        );
        let reparsed: ServiceUrl = rendered.parse().unwrap();
        assert_eq!(reparsed, url);
    }
}
