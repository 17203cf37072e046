/// The three URLs of the channel protocol, derived from one base URL.
///
/// A base without a scheme (`localhost:4000` or `//localhost:4000`) is
/// protocol-relative and resolves to plain `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    origin: String,
}

const SSE_PREFIX: &str = "__sse";

impl Endpoint {
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim_end_matches('/');

        let origin = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if let Some(rest) = trimmed.strip_prefix("//") {
            format!("http://{rest}")
        } else {
            format!("http://{trimmed}")
        };

        Self {
            base_url: base_url.to_string(),
            origin,
        }
    }

    /// The base URL exactly as it was given.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session storage key of the client id for this endpoint.
    pub fn storage_key(&self) -> String {
        format!("sse-id-{}", self.base_url)
    }

    pub fn stream_url(&self, client_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.origin,
            SSE_PREFIX,
            urlencoding::encode(client_id)
        )
    }

    pub fn channel_url(&self, client_id: &str, channel: &str) -> String {
        format!(
            "{}/channel/{}",
            self.stream_url(client_id),
            urlencoding::encode(channel)
        )
    }
}
