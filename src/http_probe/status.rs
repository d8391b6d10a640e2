/// Best-effort extraction of the status code from the first response line.
///
/// Only looks at the text before the first CRLF. The line must start with
/// `HTTP/` and its second space-separated token must be all decimal digits.
/// Anything else (including a code that does not fit in a `u16`) yields `None`.
pub fn parse_status_code(data: &[u8]) -> Option<u16> {
    let line = match data.windows(2).position(|w| w == b"\r\n") {
        Some(end) => &data[..end],
        None => data,
    };
    // latin1: every byte maps to exactly one char
    let line: String = line.iter().map(|&b| b as char).collect();

    if !line.starts_with("HTTP/") {
        return None;
    }

    let code = line.splitn(3, ' ').nth(1)?;
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}
