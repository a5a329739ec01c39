//! libcurl-backed transport: one `Easy` handle per request.

use std::str;
use std::time::Duration;
use url::Url;

use super::parse::HeaderBlock;
use super::{Response, Transport, TransportError};
use crate::config::TransportConfig;

/// Default transport. Stateless apart from its options, so building one per
/// call is cheap and nothing is shared between requests.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    /// Hard limit for the whole transfer.
    pub timeout: Duration,
    pub max_redirections: u32,
    pub user_agent: Option<String>,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::from(&TransportConfig::default())
    }
}

impl From<&TransportConfig> for CurlTransport {
    fn from(cfg: &TransportConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl Transport for CurlTransport {
    /// Runs in the current thread; call from `spawn_blocking` if used from async code.
    fn get(&self, url: &Url) -> Result<Response, TransportError> {
        let mut block = HeaderBlock::default();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.get(true)?;
        easy.follow_location(self.max_redirections > 0)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(agent) = &self.user_agent {
            easy.useragent(agent)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    block.push_line(s);
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        let status_line = block.status_line.unwrap_or_else(|| code.to_string());
        tracing::debug!("GET {} -> {}", url, status_line);
        Ok(Response::from_parts(code, status_line, block.headers, body))
    }
}
