use common::{BenchError, TargetResponse};
use governor::{DefaultDirectRateLimiter, Quota};
use nonzero_ext::nonzero;
use reqwest::Client;
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A benchmark subject the runner can invoke.
pub enum Target {
    Replay(ReplayTarget),
    Http(HttpTarget),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Replay(t) => &t.name,
            Target::Http(t) => &t.name,
        }
    }

    pub async fn invoke(&self, prompt: &str) -> Result<TargetResponse, BenchError> {
        match self {
            Target::Replay(t) => t.invoke(prompt).await,
            Target::Http(t) => t.invoke(prompt).await,
        }
    }
}

/// Cycles through canned response lines, optionally simulating response
/// latency. Stands in for a live endpoint in dry runs and tests.
pub struct ReplayTarget {
    pub name: String,
    lines: Vec<String>,
    cursor: AtomicUsize,
    latency: Duration,
    fail_every: Option<usize>,
    calls: AtomicUsize,
}

impl ReplayTarget {
    pub fn from_lines(
        name: impl Into<String>,
        lines: Vec<String>,
        latency: Duration,
    ) -> Result<Self, BenchError> {
        if lines.is_empty() {
            return Err(BenchError::ParseError("Empty replay fixture".to_string()));
        }
        Ok(Self {
            name: name.into(),
            lines,
            cursor: AtomicUsize::new(0),
            latency,
            fail_every: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn from_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        latency: Duration,
    ) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BenchError::ParseError(format!("Failed to read fixture {}: {}", path.display(), e))
        })?;
        let lines: Vec<String> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.to_string())
            .collect();
        Self::from_lines(name, lines, latency)
    }

    /// Make every n-th invocation fail, for exercising error accounting.
    pub fn failing_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n);
        self
    }

    async fn invoke(&self, _prompt: &str) -> Result<TargetResponse, BenchError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(n) = self.fail_every {
            if n > 0 && call % n == 0 {
                return Err(BenchError::TargetError("Scripted failure".to_string()));
            }
        }

        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.lines.len();
        Ok(TargetResponse {
            text: self.lines[idx].clone(),
        })
    }
}

/// Speaks a generic JSON completion endpoint:
/// `POST url {"model", "prompt", "max_tokens"}` with optional bearer auth.
pub struct HttpTarget {
    pub name: String,
    http_client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    // Client-side pacing so benchmark bursts don't trip provider limits.
    rate_limiter: DefaultDirectRateLimiter,
}

impl HttpTarget {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        max_tokens: u32,
        timeout: Duration,
        rate_limit_per_sec: u32,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        let quota = NonZeroU32::new(rate_limit_per_sec).unwrap_or(nonzero!(10u32));
        let rate_limiter =
            DefaultDirectRateLimiter::direct(Quota::per_second(quota).allow_burst(quota));

        Self {
            name: name.into(),
            http_client,
            url: url.into(),
            model: model.into(),
            api_key,
            max_tokens,
            rate_limiter,
        }
    }

    async fn invoke(&self, prompt: &str) -> Result<TargetResponse, BenchError> {
        self.rate_limiter.until_ready().await;

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "max_tokens": self.max_tokens,
        });

        let mut request = self.http_client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| BenchError::TargetError(e.to_string()))?;

        if resp.status().is_success() {
            let value: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| BenchError::ParseError(e.to_string()))?;

            let text = extract_completion(&value).ok_or_else(|| {
                BenchError::ParseError(format!("No completion text in response from {}", self.name))
            })?;
            Ok(TargetResponse { text })
        } else {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| format!("Status: {}", status));

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(BenchError::TargetError(format!("AUTH_ERROR: {}", text)));
            }

            Err(BenchError::TargetError(text))
        }
    }
}

/// Pull the completion text out of the common response shapes: a top-level
/// "text" field, or OpenAI-style "choices" (chat and legacy completions).
fn extract_completion(value: &serde_json::Value) -> Option<String> {
    if let Some(text) = value.get("text").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }

    let choice = value.get("choices")?.get(0)?;
    if let Some(content) = choice.pointer("/message/content").and_then(|v| v.as_str()) {
        return Some(content.to_string());
    }
    choice
        .get("text")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_completion_shapes() {
        let plain = json!({ "text": "hello" });
        assert_eq!(extract_completion(&plain).unwrap(), "hello");

        let chat = json!({ "choices": [{ "message": { "content": "chat hello" } }] });
        assert_eq!(extract_completion(&chat).unwrap(), "chat hello");

        let legacy = json!({ "choices": [{ "text": "legacy hello" }] });
        assert_eq!(extract_completion(&legacy).unwrap(), "legacy hello");

        let empty = json!({ "usage": {} });
        assert!(extract_completion(&empty).is_none());
    }

    #[tokio::test]
    async fn test_replay_target_cycles_lines() {
        let target = ReplayTarget::from_lines(
            "replay",
            vec!["one".to_string(), "two".to_string()],
            Duration::ZERO,
        )
        .expect("Failed to build target");

        assert_eq!(target.invoke("p").await.unwrap().text, "one");
        assert_eq!(target.invoke("p").await.unwrap().text, "two");
        assert_eq!(target.invoke("p").await.unwrap().text, "one");
    }

    #[tokio::test]
    async fn test_replay_target_scripted_failures() {
        let target = ReplayTarget::from_lines("flaky", vec!["ok".to_string()], Duration::ZERO)
            .expect("Failed to build target")
            .failing_every(2);

        assert!(target.invoke("p").await.is_ok());
        assert!(target.invoke("p").await.is_err());
        assert!(target.invoke("p").await.is_ok());
        assert!(target.invoke("p").await.is_err());
    }

    #[test]
    fn test_empty_fixture_rejected() {
        let result = ReplayTarget::from_lines("empty", Vec::new(), Duration::ZERO);
        assert!(result.is_err());
    }
}
