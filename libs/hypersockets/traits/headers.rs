use async_trait::async_trait;
use std::collections::HashMap;

/// HTTP headers to send with the WebSocket handshake
pub type Headers = HashMap<String, String>;

/// Trait for providing handshake headers dynamically
///
/// Called on every connection attempt, including reconnections, so
/// implementations can rotate credentials between dials.
///
/// # Example
/// ```ignore
/// struct ApiKeyHeaders {
///     api_key: String,
/// }
///
/// #[async_trait::async_trait]
/// impl HeaderProvider for ApiKeyHeaders {
///     async fn get_headers(&self) -> Headers {
///         let mut headers = HashMap::new();
///         headers.insert("X-API-Key".to_string(), self.api_key.clone());
///         headers
///     }
/// }
/// ```
#[async_trait]
pub trait HeaderProvider: Send + Sync {
    /// Generate headers for the next handshake
    async fn get_headers(&self) -> Headers;
}

/// A no-op header provider that doesn't add any headers
pub struct NoHeaders;

#[async_trait]
impl HeaderProvider for NoHeaders {
    async fn get_headers(&self) -> Headers {
        HashMap::new()
    }
}

/// Presents a bearer credential at handshake time
///
/// An empty token yields no `Authorization` header at all.
#[derive(Debug, Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl HeaderProvider for BearerToken {
    async fn get_headers(&self) -> Headers {
        let mut headers = HashMap::new();
        if !self.token.is_empty() {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", self.token),
            );
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bearer_token_header() {
        let headers = BearerToken::new("secret").get_headers().await;
        assert_eq!(headers.get("Authorization").unwrap(), "Bearer secret");
    }

    #[tokio::test]
    async fn test_empty_bearer_token_omits_header() {
        let headers = BearerToken::new("").get_headers().await;
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn test_no_headers() {
        assert!(NoHeaders.get_headers().await.is_empty());
    }
}
