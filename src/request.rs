use crate::error::{ClientError, ClientResult};
use futures::StreamExt;
use futures::stream::LocalBoxStream;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub use sms_admin_shared::protocol::HttpMethod;

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// 响应体字节流，按到达顺序产出
pub type BodyStream = LocalBoxStream<'static, ClientResult<Vec<u8>>>;

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn post(url: &str) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// 追加 query string（URLSearchParams 编码）
    pub fn with_query<K, V>(mut self, pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if pairs.is_empty() {
            return self;
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        let sep = if self.url.contains('?') { '&' } else { '?' };
        self.url = format!("{}{}{}", self.url, sep, query);
        self
    }

    /// 以 `application/x-www-form-urlencoded` 设置请求体
    pub fn with_form<K, V>(self, pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        let mut req = self.with_header("Content-Type", CONTENT_TYPE_FORM);
        req.body = Some(body);
        req
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
///
/// 响应体保持为流，由调用方决定整体读取还是逐块消费。
pub struct HttpResponse {
    pub status: u16,
    body: BodyStream,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    pub fn new(status: u16, body: BodyStream) -> Self {
        Self { status, body }
    }

    /// 单块响应体
    pub fn from_text(status: u16, body: impl Into<String>) -> Self {
        let bytes = body.into().into_bytes();
        Self::new(status, futures::stream::iter([Ok(bytes)]).boxed_local())
    }

    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub async fn bytes(self) -> ClientResult<Vec<u8>> {
        let mut body = self.body;
        let mut buf = Vec::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf)
    }

    pub async fn text(self) -> ClientResult<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn json<T: DeserializeOwned>(self) -> ClientResult<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn into_body(self) -> BodyStream {
        self.body
    }
}

/// HTTP 客户端特性 (Trait)
/// 使用 async_trait 以支持异步调用，(?Send) 是因为浏览器环境下 JS 类型不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse>;
}

// =========================================================
// 实现层: reqwest 客户端 (Native)
// =========================================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 复用调用方已配置好的 client（代理、超时等）
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &req.url);

        for (k, v) in &req.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(|e| {
            let err = if e.is_builder() {
                ClientError::invalid_input(format!("Reqwest Builder Error: {}", e))
            } else {
                ClientError::transport(format!("Reqwest Error: {}", e))
            };
            err.with_source(e).in_op_with("http.send", req.url.clone())
        })?;

        let status = resp.status().as_u16();
        let body = resp.bytes_stream().map(|chunk| {
            chunk.map(|b| b.to_vec()).map_err(|e| {
                ClientError::transport(format!("Reqwest Body Error: {}", e))
                    .with_source(e)
                    .in_op("http.body")
            })
        });

        Ok(HttpResponse::new(status, body.boxed_local()))
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

/// 预设响应：每个元素是一块响应体，`Err` 表示读到该处时连接中断
#[cfg(test)]
type MockBody = Vec<Result<Vec<u8>, String>>;

#[cfg(test)]
pub struct MockHttpClient {
    // URL -> (Status, Response Body)
    responses: RefCell<HashMap<String, (u16, MockBody)>>,
    // 记录发出的请求
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        self.mock_text(url, status, &body.to_string());
    }

    pub fn mock_text(&self, url: &str, status: u16, body: &str) {
        self.mock_chunks(url, status, vec![Ok(body.as_bytes().to_vec())]);
    }

    pub fn mock_chunks(&self, url: &str, status: u16, chunks: MockBody) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), (status, chunks));
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        self.requests.borrow_mut().push(req.clone());

        // 先精确匹配，再忽略 query string 匹配
        let responses = self.responses.borrow();
        let path = req.url.split('?').next().unwrap_or_default();
        let hit = responses.get(&req.url).or_else(|| responses.get(path));

        match hit {
            Some((status, chunks)) => {
                let chunks: Vec<ClientResult<Vec<u8>>> = chunks
                    .iter()
                    .map(|c| c.clone().map_err(ClientError::transport))
                    .collect();
                Ok(HttpResponse::new(
                    *status,
                    futures::stream::iter(chunks).boxed_local(),
                ))
            }
            None => Ok(HttpResponse::from_text(404, "Not Found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_body_uses_url_search_params_encoding() {
        let req = HttpRequest::post("/admin/login").with_form(&[("admin_key", "a b&c=d")]);
        assert_eq!(req.body.as_deref(), Some("admin_key=a+b%26c%3Dd"));
        assert_eq!(req.header("content-type"), Some(CONTENT_TYPE_FORM));
    }

    #[test]
    fn query_appends_with_correct_separator() {
        let req = HttpRequest::get("/x").with_query(&[("a", "1")]);
        assert_eq!(req.url, "/x?a=1");
        let req = req.with_query(&[("b", "two words")]);
        assert_eq!(req.url, "/x?a=1&b=two+words");
        let empty: [(&str, &str); 0] = [];
        assert_eq!(HttpRequest::get("/y").with_query(&empty).url, "/y");
    }

    #[tokio::test]
    async fn response_collects_chunks() {
        let body = futures::stream::iter(vec![Ok(b"{\"a\":".to_vec()), Ok(b"1}".to_vec())]);
        let resp = HttpResponse::new(200, body.boxed_local());
        assert!(resp.ok());
        let value: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn response_propagates_body_error() {
        let body = futures::stream::iter(vec![
            Ok(b"partial".to_vec()),
            Err(ClientError::transport("reset")),
        ]);
        let err = HttpResponse::new(200, body.boxed_local())
            .text()
            .await
            .unwrap_err();
        assert_eq!(err.message(), "reset");
    }
}
