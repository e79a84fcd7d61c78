//! 实时推送 (WebSocket)
//!
//! 只负责拼接带 token 的连接地址并交给连接器打开；重连、心跳、帧处理由调用方负责。

use crate::error::{ClientError, ClientResult};
use sms_admin_shared::protocol::{REALTIME_WS_PATH, RealtimeEvent};

/// 当前页面的来源信息，决定 ws / wss
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrigin {
    pub secure: bool,
    /// `host[:port]`
    pub host: String,
}

impl PageOrigin {
    pub fn new(secure: bool, host: impl Into<String>) -> Self {
        Self {
            secure,
            host: host.into(),
        }
    }

    /// 从 `http(s)://host[:port]` 形式的地址推导
    pub fn from_base_url(base_url: &str) -> ClientResult<Self> {
        let url = url::Url::parse(base_url).map_err(|e| {
            ClientError::invalid_input(format!("invalid base url: {}", e))
                .with_source(e)
                .in_op_with("realtime.origin", base_url)
        })?;
        let host = url.host_str().ok_or_else(|| {
            ClientError::invalid_input("base url has no host").in_op_with("realtime.origin", base_url)
        })?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self::new(url.scheme() == "https", host))
    }

    pub fn ws_scheme(&self) -> &'static str {
        if self.secure { "wss" } else { "ws" }
    }
}

/// 拼接 WebSocket 地址；未登录时 token 为空，由服务端拒绝
pub fn websocket_url(origin: &PageOrigin, token: Option<&str>) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token.unwrap_or_default())
        .finish();
    format!(
        "{}://{}{}?{}",
        origin.ws_scheme(),
        origin.host,
        REALTIME_WS_PATH,
        query
    )
}

/// WebSocket 连接器
///
/// 浏览器中为 `web::BrowserSocketConnector`；原生端由调用方按需实现。
pub trait RealtimeConnector {
    type Socket;

    fn connect(&self, url: &str) -> ClientResult<Self::Socket>;
}

/// 解析服务端推送的一条消息
pub fn parse_realtime_event(text: &str) -> ClientResult<RealtimeEvent> {
    serde_json::from_str(text).map_err(|e| ClientError::from(e).in_op("realtime.parse"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_follows_origin() {
        let secure = PageOrigin::new(true, "admin.example.com");
        let plain = PageOrigin::new(false, "localhost:5173");
        assert_eq!(
            websocket_url(&secure, Some("abc")),
            "wss://admin.example.com/admin/ws?token=abc"
        );
        assert_eq!(
            websocket_url(&plain, Some("abc")),
            "ws://localhost:5173/admin/ws?token=abc"
        );
        assert_eq!(
            websocket_url(&plain, None),
            "ws://localhost:5173/admin/ws?token="
        );
    }

    #[test]
    fn origin_from_base_url() {
        assert_eq!(
            PageOrigin::from_base_url("https://gw.example.com").unwrap(),
            PageOrigin::new(true, "gw.example.com")
        );
        assert_eq!(
            PageOrigin::from_base_url("http://127.0.0.1:8000/").unwrap(),
            PageOrigin::new(false, "127.0.0.1:8000")
        );
        assert!(PageOrigin::from_base_url("/admin").is_err());
    }

    #[test]
    fn parse_events() {
        assert_eq!(
            parse_realtime_event(r#"{"event":"removed_file","folder":"outgoing","filename":"x.sms"}"#)
                .unwrap(),
            RealtimeEvent::RemovedFile {
                folder: "outgoing".into(),
                filename: "x.sms".into()
            }
        );
        assert!(parse_realtime_event("not json").is_err());
    }
}
