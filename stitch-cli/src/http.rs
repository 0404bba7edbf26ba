//! Blocking HTTP implementation of [`Remote`].
//!
//! ```text
//! GET {base_url}/customizations/{kind}          -> [WirePayload]
//! PUT {base_url}/customizations/{kind}/{name}   <- WirePayload
//! ```

use std::time::Duration;

use stitch_core::{ItemKind, ProjectConfig};
use stitch_sync::{Remote, RemoteError, WirePayload};

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpRemote {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpRemote {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token(),
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = format!("{}/customizations", self.base_url);
        for segment in segments {
            url.push('/');
            url.push_str(&encode_segment(segment));
        }
        url
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        let request = request.set("Accept", "application/json");
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }
}

impl Remote for HttpRemote {
    fn fetch(&mut self, kind: ItemKind) -> Result<Vec<WirePayload>, RemoteError> {
        let url = self.url(&[kind.as_str()]);
        let response = self
            .authorize(self.agent.get(&url))
            .call()
            .map_err(|e| describe(&url, e))?;
        response
            .into_json::<Vec<WirePayload>>()
            .map_err(|e| RemoteError::new(format!("GET {url}: unreadable response: {e}")))
    }

    fn send(&mut self, payload: &WirePayload) -> Result<(), RemoteError> {
        let url = self.url(&[payload.kind.as_str(), &payload.name]);
        self.authorize(self.agent.put(&url))
            .send_json(payload)
            .map_err(|e| describe(&url, e))?;
        Ok(())
    }
}

fn describe(url: &str, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                RemoteError::new(format!("{url}: HTTP {code}"))
            } else {
                RemoteError::new(format!("{url}: HTTP {code}: {body}"))
            }
        }
        ureq::Error::Transport(transport) => RemoteError::new(format!("{url}: {transport}")),
    }
}

/// Percent-encode everything outside the URL path-segment unreserved set.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let config = ProjectConfig::new("acme", "https://api.example.com/v1/");
        let remote = HttpRemote::new(&config);
        assert_eq!(
            remote.url(&["backend-script", "Nightly Job"]),
            "https://api.example.com/v1/customizations/backend-script/Nightly%20Job"
        );
        assert_eq!(remote.url(&["page"]), "https://api.example.com/v1/customizations/page");
    }

    #[test]
    fn segment_encoding_keeps_unreserved() {
        assert_eq!(encode_segment("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_segment("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(encode_segment("ü"), "%C3%BC");
    }
}
