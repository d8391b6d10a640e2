use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::ResolveError;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to resolve host: {0}")]
    Resolve(#[from] ResolveError),
    #[error("no address found for host {0}")]
    NoAddress(String),
}

impl ConnectError {
    /// Short category name used in the `error:<kind>` outcome.
    pub fn kind(&self) -> String {
        match self {
            ConnectError::Io(e) => format!("{:?}", e.kind()),
            ConnectError::Resolve(_) => "Resolve".to_string(),
            ConnectError::NoAddress(_) => "NoAddress".to_string(),
        }
    }
}

/// Opens the one connection a probe talks over.
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Self::Stream, ConnectError>> + Send;
}

/// Resolves through the configured DNS resolver and connects over plain TCP.
pub struct TcpConnector {
    resolver: TokioAsyncResolver,
}

impl TcpConnector {
    pub fn new(resolver: TokioAsyncResolver) -> Self {
        TcpConnector { resolver }
    }

    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ConnectError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }
        Ok(self.resolver.lookup_ip(host).await?.iter().collect())
    }
}

/// Tries every address in order and returns the first stream that connects.
/// When none does, the error of the last attempt is returned.
pub async fn connect_any(host: &str, addrs: &[SocketAddr]) -> Result<TcpStream, ConnectError> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(*addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                log::trace!("connect to {addr} failed: {e}");
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) => Err(ConnectError::Io(e)),
        None => Err(ConnectError::NoAddress(host.to_string())),
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ConnectError> {
        let addrs: Vec<SocketAddr> = self
            .resolve(host)
            .await?
            .into_iter()
            .map(|ip| SocketAddr::new(ip, port))
            .collect();
        connect_any(host, &addrs).await
    }
}
