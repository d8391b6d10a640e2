use std::fmt;
use std::time::Duration;

/// Terminal classification of a single probe. Exactly one per result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The peer actively rejected the connection.
    Refused,
    /// Connect, write or a read exceeded the per-operation timeout.
    Timeout,
    /// The peer closed the connection before sending a single byte.
    Closed,
    /// At least one byte came back.
    Responded,
    /// Connected and sent, but nothing was read and nothing else happened.
    Silent,
    /// Any other transport failure, labelled with a short category name.
    Error(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Refused => f.write_str("refused"),
            Outcome::Timeout => f.write_str("timeout"),
            Outcome::Closed => f.write_str("closed"),
            Outcome::Responded => f.write_str("responded"),
            Outcome::Silent => f.write_str("silent"),
            Outcome::Error(kind) => write!(f, "error:{kind}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub id: u64,
    pub outcome: Outcome,
    pub http_status: Option<u16>,
    pub bytes: u64,
    pub ttfb: Option<Duration>,
    pub latency: Duration,
}

impl ProbeResult {
    pub fn ttfb_ms(&self) -> Option<u128> {
        self.ttfb.map(|d| d.as_millis())
    }

    pub fn latency_ms(&self) -> u128 {
        self.latency.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_tokens() {
        assert_eq!(Outcome::Refused.to_string(), "refused");
        assert_eq!(Outcome::Timeout.to_string(), "timeout");
        assert_eq!(Outcome::Closed.to_string(), "closed");
        assert_eq!(Outcome::Responded.to_string(), "responded");
        assert_eq!(Outcome::Silent.to_string(), "silent");
        assert_eq!(
            Outcome::Error("ConnectionReset".to_string()).to_string(),
            "error:ConnectionReset"
        );
    }

    #[test]
    fn test_millisecond_views_truncate() {
        let result = ProbeResult {
            id: 1,
            outcome: Outcome::Responded,
            http_status: Some(200),
            bytes: 19,
            ttfb: Some(Duration::from_micros(1_999)),
            latency: Duration::from_micros(2_999),
        };
        assert_eq!(result.ttfb_ms(), Some(1));
        assert_eq!(result.latency_ms(), 2);
    }
}
