use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Fire a batch of concurrent HTTP GET probes at a host and report how each one went.
///
/// Every flag can also come from the environment (or a `.env` file) and from
/// the YAML file passed with `--config`. Flags win over the file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// YAML file with probe settings
    #[arg(long, env = "CONFIG_FILE", value_name = "YAML FILE")]
    pub config: Option<PathBuf>,

    /// Target as a URL, e.g. http://localhost:8080/health
    #[arg(long, env = "PROBE_URL", conflicts_with_all = ["host", "port", "path"])]
    pub url: Option<String>,

    /// Server host name or IP [default: 127.0.0.1]
    #[arg(long, env = "PROBE_HOST")]
    pub host: Option<String>,

    /// Server port [default: 8080]
    #[arg(long, env = "PROBE_PORT")]
    pub port: Option<u16>,

    /// Request path [default: /]
    #[arg(long, env = "PROBE_PATH")]
    pub path: Option<String>,

    /// Total number of GET requests [default: 50]
    #[arg(long, env = "PROBE_REQUESTS")]
    pub requests: Option<usize>,

    /// How many requests run in parallel [default: 10]
    #[arg(long, env = "PROBE_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Timeout in seconds for the connect and for every read [default: 2.0]
    #[arg(long, env = "PROBE_TIMEOUT", value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Max bytes to read per request [default: 65536]
    #[arg(long, env = "PROBE_MAX_BYTES")]
    pub max_bytes: Option<u64>,

    /// Value for the Host header, defaults to the target host
    #[arg(long, env = "PROBE_HOST_HEADER")]
    pub host_header: Option<String>,

    /// Comma separated DNS servers to resolve the host with, system resolver when unset
    #[arg(long, env = "DNS_HOSTS", value_delimiter = ',')]
    pub dns_hosts: Vec<String>,
}
