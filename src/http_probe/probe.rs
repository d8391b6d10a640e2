use std::io;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use super::prelude::*;

const FIRST_READ_SIZE: usize = 4096;
const MAX_READ_SIZE: usize = 65536;

#[derive(Default)]
struct Progress {
    http_status: Option<u16>,
    bytes: u64,
    ttfb: Option<Duration>,
}

enum ReadStep {
    Data(usize),
    TimedOut,
    Failed(io::Error),
}

fn classify_io_error(err: &io::Error) -> Outcome {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => Outcome::Refused,
        io::ErrorKind::TimedOut => Outcome::Timeout,
        kind => Outcome::Error(format!("{kind:?}")),
    }
}

fn classify_connect_error(err: &ConnectError) -> Outcome {
    match err {
        ConnectError::Io(e) => classify_io_error(e),
        other => Outcome::Error(other.kind()),
    }
}

async fn read_step<S>(stream: &mut S, buf: &mut [u8], limit: Duration) -> ReadStep
where
    S: AsyncRead + Unpin,
{
    match timeout(limit, stream.read(buf)).await {
        Err(_) => ReadStep::TimedOut,
        Ok(Ok(n)) => ReadStep::Data(n),
        Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => ReadStep::TimedOut,
        Ok(Err(e)) => ReadStep::Failed(e),
    }
}

/// Sends the request and reads until the peer closes, the byte budget is
/// spent, a read times out or the transport fails.
async fn exchange<S>(
    stream: &mut S,
    request: &ProbeRequest,
    start: Instant,
    progress: &mut Progress,
) -> Outcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(request.timeout, stream.write_all(&request.to_wire())).await {
        Err(_) => return Outcome::Timeout,
        Ok(Err(e)) => return classify_io_error(&e),
        Ok(Ok(())) => {}
    }

    let mut buf = vec![0u8; MAX_READ_SIZE];

    // A silent first read is not fatal, the loop below decides.
    match read_step(stream, &mut buf[..FIRST_READ_SIZE], request.timeout).await {
        ReadStep::Data(n) if n > 0 => {
            progress.ttfb = Some(start.elapsed());
            progress.http_status = parse_status_code(&buf[..n]);
            progress.bytes += n as u64;
        }
        ReadStep::Data(_) | ReadStep::TimedOut => {}
        ReadStep::Failed(e) => return classify_io_error(&e),
    }

    while progress.bytes < request.max_bytes {
        let want = (request.max_bytes - progress.bytes).min(MAX_READ_SIZE as u64) as usize;
        match read_step(stream, &mut buf[..want], request.timeout).await {
            ReadStep::Data(0) if progress.bytes == 0 => return Outcome::Closed,
            ReadStep::Data(0) => return Outcome::Responded,
            ReadStep::Data(n) => progress.bytes += n as u64,
            ReadStep::TimedOut => return Outcome::Timeout,
            ReadStep::Failed(e) => return classify_io_error(&e),
        }
    }

    if progress.bytes > 0 {
        Outcome::Responded
    } else {
        Outcome::Silent
    }
}

/// Performs one GET over one fresh connection. Never fails: every transport
/// problem ends up in [`ProbeResult::outcome`].
pub async fn run<C: Connector>(connector: &C, request: &ProbeRequest) -> ProbeResult {
    let start = Instant::now();
    let mut progress = Progress::default();

    let connect = connector.connect(&request.host, request.port);
    let outcome = match timeout(request.timeout, connect).await {
        Err(_) => Outcome::Timeout,
        Ok(Err(e)) => {
            log::trace!(
                "probe {}: connect to {}:{} failed: {}",
                request.id,
                request.host,
                request.port,
                report(&e)
            );
            classify_connect_error(&e)
        }
        Ok(Ok(mut stream)) => exchange(&mut stream, request, start, &mut progress).await,
    };

    let result = ProbeResult {
        id: request.id,
        outcome,
        http_status: progress.http_status,
        bytes: progress.bytes,
        ttfb: progress.ttfb,
        latency: start.elapsed(),
    };
    log::debug!(
        "probe {}: {} status={:?} bytes={} latency={:?}",
        result.id,
        result.outcome,
        result.http_status,
        result.bytes,
        result.latency
    );
    result
}
