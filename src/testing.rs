//! Scripted collaborators for tests, plus a loopback HTTP server for the
//! reqwest-backed implementations.

use crate::llm::{LanguageModel, OutputSchema};
use crate::model::{FetchError, ModelError};
use crate::scraper::ContentFetcher;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

type Script<T> = Box<dyn Fn(&str) -> Result<T, ModelError> + Send + Sync>;
type DelayScript = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Record of a call made to the scripted model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelCall {
    Complete {
        prompt: String,
        max_output_tokens: u32,
    },
    Structured {
        prompt: String,
        max_output_tokens: u32,
        schema_name: String,
    },
}

/// Language model whose replies are computed from the prompt.
///
/// By default `complete` echoes the prompt and `complete_structured` fails,
/// so tests only script what they exercise.
pub struct ScriptedModel {
    complete: Script<String>,
    structured: Script<Value>,
    delay: DelayScript,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn echo() -> Self {
        Self {
            complete: Box::new(|prompt| Ok(prompt.to_string())),
            structured: Box::new(|_| Err(ModelError::EmptyResponse)),
            delay: Box::new(|_| Duration::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, ModelError> + Send + Sync + 'static,
    {
        self.complete = Box::new(f);
        self
    }

    pub fn on_structured<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        self.structured = Box::new(f);
        self
    }

    pub fn with_delay<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Duration + Send + Sync + 'static,
    {
        self.delay = Box::new(f);
        self
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn pause(&self, prompt: &str) {
        let delay = (self.delay)(prompt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(ModelCall::Complete {
            prompt: prompt.to_string(),
            max_output_tokens,
        });
        self.pause(prompt).await;
        (self.complete)(prompt)
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        schema: &OutputSchema,
    ) -> Result<Value, ModelError> {
        self.calls.lock().unwrap().push(ModelCall::Structured {
            prompt: prompt.to_string(),
            max_output_tokens,
            schema_name: schema.name.clone(),
        });
        self.pause(prompt).await;
        (self.structured)(prompt)
    }
}

/// Fetcher serving fixed pages. Unknown URLs answer with a 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    delays: HashMap<String, Duration>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(content.to_string()));
        self
    }

    pub fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.pages
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

/// A structured reply describing one service per name, other fields absent
/// unless given in `fields`.
pub fn listing(names: &[&str]) -> Value {
    let services: Vec<Value> = names.iter().map(|name| service(name, &[])).collect();
    serde_json::json!({ "services": services })
}

pub fn service(name: &str, fields: &[(&str, &str)]) -> Value {
    let mut object = serde_json::json!({
        "service_name": name,
        "starting_price": null,
        "description": null,
        "features": null,
        "uptime_guarantee": null,
        "security_features": null,
        "backup_options": null,
        "free_domain": null,
        "money_back_guarantee": null,
        "details": null
    });
    for (key, value) in fields {
        object[*key] = Value::String(value.to_string());
    }
    object
}

/// A loopback server that answers exactly one request with a canned response.
pub struct OneShotServer {
    pub url: String,
    request: oneshot::Receiver<String>,
}

impl OneShotServer {
    pub async fn start(status: &str, content_type: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(request);
        });

        Self { url, request: rx }
    }

    /// The raw request the server received, head and body.
    pub async fn request(self) -> String {
        self.request.await.unwrap()
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            if n == 0 {
                break;
            }
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if n == 0 || buf.len() >= head_end + 4 + body_len {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// reqwest client that ignores proxy settings from the environment.
pub fn loopback_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
