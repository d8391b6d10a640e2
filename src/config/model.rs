use serde::Deserialize;

/// Probe settings as read from the YAML config file.
/// Every field is optional; command line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Host name or IP address of the server under test.
    pub host: Option<String>,

    pub port: Option<u16>,

    /// Request path, must start with '/'.
    pub path: Option<String>,

    /// Total number of GET requests to issue.
    pub requests: Option<usize>,

    /// Number of requests in flight at the same time.
    pub concurrency: Option<usize>,

    /// Per-operation timeout. Applies to the connect and to every read.
    pub timeout_seconds: Option<f64>,

    /// Byte budget per request.
    pub max_bytes: Option<u64>,

    /// Value for the 'Host' header. Defaults to the host.
    pub host_header: Option<String>,

    /// DNS servers to query instead of the system resolver.
    #[serde(default)]
    pub dns_hosts: Vec<String>,
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_file_config_deserialization() {
        let yaml = r#"
                    host: api.internal
                    port: 9090
                    path: /healthz
                    requests: 200
                    concurrency: 25
                    timeout_seconds: 0.5
                    max_bytes: 1024
                    host_header: api.example.com
                    dns_hosts: [10.0.0.2, 10.0.0.3]
                    "#;

        let config: FileConfig = serde_yaml::from_str(yaml).expect("Invalid YAML");
        assert_eq!(config.host.as_deref(), Some("api.internal"));
        assert_eq!(config.port, Some(9090));
        assert_eq!(config.path.as_deref(), Some("/healthz"));
        assert_eq!(config.requests, Some(200));
        assert_eq!(config.concurrency, Some(25));
        assert_eq!(config.timeout_seconds, Some(0.5));
        assert_eq!(config.max_bytes, Some(1024));
        assert_eq!(config.host_header.as_deref(), Some("api.example.com"));
        assert_eq!(config.dns_hosts, vec!["10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn test_partial_file_config() {
        let config: FileConfig = serde_yaml::from_str("port: 8081").expect("Invalid YAML");
        assert_eq!(config.port, Some(8081));
        assert!(config.host.is_none());
        assert!(config.dns_hosts.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<FileConfig, _> = serde_yaml::from_str("prot: 8081");
        assert!(result.is_err());
    }
}
