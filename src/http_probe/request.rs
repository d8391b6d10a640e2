use std::net::Ipv6Addr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InvalidTemplate {
    #[error("port must be between 1 and 65535")]
    PortZero,
    #[error("request path must start with '/', got {0:?}")]
    RelativePath(String),
    #[error("timeout must be a positive duration")]
    ZeroTimeout,
}

/// Everything needed to probe a target except the per-request identifier.
#[derive(Debug, Clone)]
pub struct ProbeTemplate {
    host: String,
    port: u16,
    path: String,
    host_header: String,
    timeout: Duration,
    max_bytes: u64,
}

impl ProbeTemplate {
    /// An empty `host_header` falls back to `host`, bracketed when it is an IPv6 literal.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
        host_header: impl Into<String>,
        timeout: Duration,
        max_bytes: u64,
    ) -> Result<Self, InvalidTemplate> {
        let host = host.into();
        let path = path.into();
        let host_header = host_header.into();

        if port == 0 {
            return Err(InvalidTemplate::PortZero);
        }
        if !path.starts_with('/') {
            return Err(InvalidTemplate::RelativePath(path));
        }
        if timeout.is_zero() {
            return Err(InvalidTemplate::ZeroTimeout);
        }

        let host_header = match (host_header.is_empty(), host.parse::<Ipv6Addr>()) {
            (false, _) => host_header,
            // IPv6 literals are bracketed in a Host header
            (true, Ok(ip)) => format!("[{ip}]"),
            (true, Err(_)) => host.clone(),
        };

        Ok(ProbeTemplate {
            host,
            port,
            path,
            host_header,
            timeout,
            max_bytes,
        })
    }

    pub fn request(&self, id: u64) -> ProbeRequest {
        ProbeRequest {
            id,
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            host_header: self.host_header.clone(),
            timeout: self.timeout,
            max_bytes: self.max_bytes,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub id: u64,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub host_header: String,
    /// Bounds the connect, the write and every single read.
    pub timeout: Duration,
    pub max_bytes: u64,
}

impl ProbeRequest {
    /// The request bytes as they go on the wire. Non-ASCII characters are dropped.
    pub fn to_wire(&self) -> Vec<u8> {
        build_request(&self.path, &self.host_header)
    }
}

pub fn build_request(path: &str, host_header: &str) -> Vec<u8> {
    format!("GET {path} HTTP/1.1\r\nHost: {host_header}\r\nConnection: close\r\n\r\n")
        .chars()
        .filter(char::is_ascii)
        .map(|c| c as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(host_header: &str) -> ProbeTemplate {
        ProbeTemplate::new(
            "127.0.0.1",
            8080,
            "/health",
            host_header,
            Duration::from_secs(2),
            65536,
        )
        .expect("valid template")
    }

    #[test]
    fn test_build_request_is_bit_exact() {
        let wire = build_request("/index.html", "example.com");
        assert_eq!(
            wire,
            b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn test_build_request_drops_non_ascii() {
        let wire = build_request("/caf\u{e9}/\u{1f980}", "b\u{fc}cher.example");
        assert_eq!(
            wire,
            b"GET /caf/ HTTP/1.1\r\nHost: bcher.example\r\nConnection: close\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn test_host_header_defaults_to_host() {
        let request = template("").request(7);
        assert_eq!(request.id, 7);
        assert_eq!(request.host_header, "127.0.0.1");

        let request = template("api.internal").request(8);
        assert_eq!(request.host_header, "api.internal");
        assert_eq!(request.host, "127.0.0.1");
    }

    #[test]
    fn test_ipv6_host_header_is_bracketed() {
        let template =
            ProbeTemplate::new("::1", 8080, "/", "", Duration::from_secs(1), 1).expect("valid template");
        let request = template.request(1);
        assert_eq!(request.host, "::1");
        assert_eq!(request.host_header, "[::1]");
        assert_eq!(
            request.to_wire(),
            b"GET / HTTP/1.1\r\nHost: [::1]\r\nConnection: close\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn test_template_validation() {
        let timeout = Duration::from_secs(1);
        assert_eq!(
            ProbeTemplate::new("h", 0, "/", "", timeout, 1).unwrap_err(),
            InvalidTemplate::PortZero
        );
        assert_eq!(
            ProbeTemplate::new("h", 80, "health", "", timeout, 1).unwrap_err(),
            InvalidTemplate::RelativePath("health".to_string())
        );
        assert_eq!(
            ProbeTemplate::new("h", 80, "/", "", Duration::ZERO, 1).unwrap_err(),
            InvalidTemplate::ZeroTimeout
        );
        assert!(ProbeTemplate::new("h", 65535, "/", "", timeout, 0).is_ok());
    }
}
