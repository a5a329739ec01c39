//! Parse raw HTTP response header lines collected from libcurl.

/// Status code and status line (`"200 OK"`) from an `HTTP/x.y CODE REASON` line.
pub(crate) fn parse_status_line(line: &str) -> Option<(u32, String)> {
    let line = line.trim();
    let rest = line.strip_prefix("HTTP/")?;
    let (_version, rest) = rest.split_once(' ')?;
    let rest = rest.trim();
    let code_str = rest.split_whitespace().next()?;
    let code = code_str.parse::<u32>().ok()?;
    Some((code, rest.to_string()))
}

/// `Name: value` pair from a header line; `None` for blank or malformed lines.
pub(crate) fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Header block of the final response in a (possibly redirected) exchange.
///
/// libcurl reports the header lines of every response it follows, so each new
/// status line starts a fresh block.
#[derive(Debug, Default)]
pub(crate) struct HeaderBlock {
    pub status_line: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HeaderBlock {
    pub fn push_line(&mut self, line: &str) {
        if let Some((_, status_line)) = parse_status_line(line) {
            self.status_line = Some(status_line);
            self.headers.clear();
        } else if let Some(pair) = parse_header_line(line) {
            self.headers.push(pair);
        }
    }
}

/// Reason phrase for common status codes; empty for unknown codes.
pub fn reason_phrase(code: u32) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        416 => "Range Not Satisfiable",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
