pub mod connector;
pub mod probe;
pub mod request;
pub mod result;
pub mod status;

pub mod prelude {
    pub use super::connector::{ConnectError, Connector, TcpConnector};
    pub use super::report;
    pub use super::request::{InvalidTemplate, ProbeRequest, ProbeTemplate};
    pub use super::result::{Outcome, ProbeResult};
    pub use super::status::parse_status_code;
}

use std::fmt::Write;

/// Flattens an error and its sources into one message.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
