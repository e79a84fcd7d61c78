use std::fmt;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误类型枚举
///
/// UI 层只需要关心 `Unauthorized`（跳转登录页），其余类型用于展示与调试。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// 受保护接口返回 401，本地 token 已被清除
    Unauthorized,
    /// 登录接口返回非 2xx
    LoginFailed,
    /// 其余非 2xx 响应
    RequestFailed,
    /// 网络错误或响应流中断
    Transport,
    /// 响应体不是预期的 JSON
    Decode,
    /// 请求无法构造（如 URL 非法）
    InvalidInput,
}

impl ClientErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientErrorKind::Unauthorized => "UNAUTHORIZED",
            ClientErrorKind::LoginFailed => "LOGIN_FAILED",
            ClientErrorKind::RequestFailed => "REQUEST_FAILED",
            ClientErrorKind::Transport => "TRANSPORT_ERROR",
            ClientErrorKind::Decode => "DECODE_ERROR",
            ClientErrorKind::InvalidInput => "INVALID_INPUT",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "api.login", "http.send"
    pub operation: String,
    /// 额外细节，如文件夹名、状态码
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

struct Trace<'a>(&'a [ErrorSpan]);

impl fmt::Display for Trace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " | trace: ")?;
        for (i, span) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", span.operation)?;
            if let Some(detail) = &span.detail {
                write!(f, "({})", detail)?;
            }
        }
        Ok(())
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端错误
///
/// - kind: 错误类型
/// - message: 面向用户的消息（登录失败时为服务端 `detail`）
/// - status: 触发错误的 HTTP 状态码（如有）
/// - source: 原始错误（可选）
/// - spans: 操作追踪
#[derive(Debug, thiserror::Error)]
#[error("[{code}] {message}{trace}", code = .kind.error_code(), trace = Trace(.spans))]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
    pub status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn unauthorized() -> Self {
        Self::new(ClientErrorKind::Unauthorized, "UNAUTHORIZED").with_status(401)
    }

    pub fn login_failed(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::LoginFailed, message)
    }

    pub fn request_failed(message: impl Into<String>, status: u16) -> Self {
        Self::new(ClientErrorKind::RequestFailed, message).with_status(status)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Decode, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::InvalidInput, message)
    }

    // --- Context builders ---

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    /// UI 据此判断是否需要跳转到登录页
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ClientErrorKind::Unauthorized
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::decode(e.to_string()).with_source(e)
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
