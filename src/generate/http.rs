//! Client for a remote summarization service.
//!
//! Each summary context is POSTed as JSON to the configured endpoint, which
//! answers with a [`GeneratedSummary`] body. Any failure for an item is
//! logged and answered by the template generator instead.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use thiserror::Error;

use super::{GeneratedSummary, SummaryContext, SummaryGenerator, TemplateGenerator};
use crate::config::GeneratorConfig;

/// Errors that can occur while talking to the service.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("service answered HTTP {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

pub struct HttpGenerator {
    http: Client,
    endpoint: String,
    timeout: Duration,
    concurrency: usize,
    api_key: Option<String>,
    fallback: TemplateGenerator,
    runtime: tokio::runtime::Runtime,
}

impl HttpGenerator {
    /// Create a generator from the `generator` config section.
    pub fn from_config(config: &GeneratorConfig) -> anyhow::Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| anyhow::anyhow!("http generator requires an endpoint"))?;

        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());

        let http = Client::builder()
            .user_agent(concat!("docweave/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            timeout: Duration::from_millis(config.timeout_ms),
            concurrency: config.concurrency.max(1),
            api_key,
            fallback: TemplateGenerator::new(),
            runtime: tokio::runtime::Runtime::new()?,
        })
    }

    /// Ask the service for one summary.
    pub async fn request(
        &self,
        context: &SummaryContext,
    ) -> Result<GeneratedSummary, GeneratorError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(context);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GeneratorError::Timeout
            } else {
                GeneratorError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Status(status.as_u16()));
        }

        response
            .json::<GeneratedSummary>()
            .await
            .map_err(|e| GeneratorError::Decode(e.to_string()))
    }

    async fn request_or_fallback(&self, context: &SummaryContext) -> GeneratedSummary {
        match self.request(context).await {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!(
                    "summary for {} failed ({}), using template text",
                    context.name,
                    e
                );
                self.fallback.generate(context)
            }
        }
    }
}

impl SummaryGenerator for HttpGenerator {
    fn name(&self) -> &'static str {
        "http"
    }

    fn generate(&self, context: &SummaryContext) -> GeneratedSummary {
        self.runtime.block_on(self.request_or_fallback(context))
    }

    /// Requests run concurrently, at most `concurrency` at a time.
    fn generate_batch(&self, contexts: &[SummaryContext]) -> Vec<GeneratedSummary> {
        self.runtime.block_on(async {
            stream::iter(contexts)
                .map(|context| self.request_or_fallback(context))
                .buffered(self.concurrency)
                .collect::<Vec<_>>()
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::structure;
    use crate::config::GeneratorKind;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serve `count` requests with the same JSON body, returning the port.
    fn serve(count: usize, status: &'static str, body: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        std::thread::spawn(move || {
            for stream in listener.incoming().take(count) {
                let mut stream = stream.unwrap();
                read_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        port
    }

    fn read_request(stream: &mut std::net::TcpStream) {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + length {
                    return;
                }
            }
        }
    }

    fn generator(endpoint: String) -> HttpGenerator {
        HttpGenerator::from_config(&GeneratorConfig {
            kind: GeneratorKind::Http,
            endpoint: Some(endpoint),
            timeout_ms: 2_000,
            concurrency: 2,
            api_key_env: None,
        })
        .unwrap()
    }

    #[test]
    fn test_remote_summary_used() {
        let port = serve(
            2,
            "200 OK",
            r#"{"summary":"Remote text.","parameters":{},"returns":null}"#,
        );
        let g = generator(format!("http://127.0.0.1:{}/summarize", port));
        let context = SummaryContext::for_structure(&structure("Cart", 0, 10));

        let results = g.generate_batch(&[context.clone(), context]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.summary == "Remote text."));
    }

    #[test]
    fn test_error_status_falls_back_to_template() {
        let port = serve(1, "500 Internal Server Error", "{}");
        let g = generator(format!("http://127.0.0.1:{}/summarize", port));
        let context = SummaryContext::for_structure(&structure("Cart", 0, 10));

        let result = g.generate(&context);
        assert_eq!(result.summary, "Represents the cart.");
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let result = HttpGenerator::from_config(&GeneratorConfig {
            kind: GeneratorKind::Http,
            ..GeneratorConfig::default()
        });
        assert!(result.is_err());
    }
}
