use std::net::{AddrParseError, IpAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use thiserror::Error;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
    error::ResolveError,
};
use url::{Host, Url};

use super::cli::Cli;
use super::model::FileConfig;
use crate::http_probe::prelude::*;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PATH: &str = "/";
const DEFAULT_REQUESTS: usize = 50;
const DEFAULT_CONCURRENCY: usize = 10;
const DEFAULT_TIMEOUT_SECONDS: f64 = 2.0;
const DEFAULT_MAX_BYTES: u64 = 65536;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid YAML in config file {path:?}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid target URL {0:?}")]
    Url(String, #[source] url::ParseError),
    #[error("unsupported scheme in {0:?}, only http:// targets can be probed")]
    Scheme(String),
    #[error("target URL {0:?} has no host")]
    MissingHost(String),
    #[error("invalid timeout of {0} seconds")]
    Timeout(f64),
    #[error("invalid DNS host {0:?}")]
    DnsHost(String, #[source] AddrParseError),
    #[error("failed to load the system resolver configuration")]
    SystemResolver(#[source] ResolveError),
    #[error(transparent)]
    Template(#[from] InvalidTemplate),
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct AppConfig {
    pub template: ProbeTemplate,
    pub requests: usize,
    pub concurrency: usize,
    pub dns_hosts: Vec<String>,
}

impl AppConfig {
    /// `host:port/path`, for display.
    pub fn target(&self) -> String {
        format!(
            "{}:{}{}",
            self.template.host(),
            self.template.port(),
            self.template.path()
        )
    }
}

/// Load the application configuration from the command line, the environment
/// and the optional YAML file named by `--config` / `CONFIG_FILE`.
/// Flags and environment variables override values from the file, which in
/// turn override the built-in defaults.
pub fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let file = match &cli.config {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };
    let config = merge(cli, file)?;
    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Splits an `http://` URL into host, port and path (query included).
pub fn parse_target(raw: &str) -> Result<(String, u16, String), ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Url(raw.to_string(), e))?;
    if url.scheme() != "http" {
        return Err(ConfigError::Scheme(raw.to_string()));
    }

    let host = match url.host() {
        Some(Host::Ipv6(ip)) => ip.to_string(),
        Some(host) => host.to_string(),
        None => return Err(ConfigError::MissingHost(raw.to_string())),
    };
    let port = url.port_or_known_default().unwrap_or(80);

    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    Ok((host, port, path))
}

fn merge(cli: &Cli, file: FileConfig) -> Result<AppConfig, ConfigError> {
    let (host, port, path) = match &cli.url {
        Some(raw) => parse_target(raw)?,
        None => (
            cli.host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            cli.path
                .clone()
                .or(file.path)
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
        ),
    };

    let timeout_seconds = cli
        .timeout
        .or(file.timeout_seconds)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
    let timeout = Duration::try_from_secs_f64(timeout_seconds)
        .map_err(|_| ConfigError::Timeout(timeout_seconds))?;

    let host_header = cli
        .host_header
        .clone()
        .or(file.host_header)
        .unwrap_or_default();
    let max_bytes = cli.max_bytes.or(file.max_bytes).unwrap_or(DEFAULT_MAX_BYTES);

    let template = ProbeTemplate::new(host, port, path, host_header, timeout, max_bytes)?;

    let dns_hosts = if cli.dns_hosts.is_empty() {
        file.dns_hosts
    } else {
        cli.dns_hosts.clone()
    };
    let dns_hosts = dns_hosts
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(AppConfig {
        template,
        requests: cli.requests.or(file.requests).unwrap_or(DEFAULT_REQUESTS),
        concurrency: cli
            .concurrency
            .or(file.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY),
        dns_hosts,
    })
}

/// Setup a DNS resolver using the provided DNS hosts.
/// With no hosts the system resolver configuration is used. Otherwise the
/// resolver only queries the given servers, over TCP, with 2 attempts, a
/// timeout of 100 milliseconds and a cache size of 1024.
pub fn setup_resolver(dns_hosts: &[String]) -> Result<TokioAsyncResolver, ConfigError> {
    if dns_hosts.is_empty() {
        return TokioAsyncResolver::tokio_from_system_conf().map_err(ConfigError::SystemResolver);
    }

    let mut opts = ResolverOpts::default();
    opts.attempts = 2;
    opts.timeout = Duration::from_millis(100);
    opts.cache_size = 1024;

    let mut name_servers = NameServerConfigGroup::new();

    for host in dns_hosts {
        let ip: IpAddr = host
            .parse()
            .map_err(|e| ConfigError::DnsHost(host.clone(), e))?;
        name_servers.push(NameServerConfig {
            socket_addr: (ip, 53).into(),
            protocol: Protocol::Tcp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    Ok(TokioAsyncResolver::tokio(resolver_config, opts))
}
