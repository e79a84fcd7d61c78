use super::http::js_error;
use crate::error::{ClientError, ClientResult};
use crate::realtime::{PageOrigin, RealtimeConnector};

/// 从 `window.location` 读取当前页面来源
pub fn page_origin() -> ClientResult<PageOrigin> {
    let location = web_sys::window()
        .ok_or_else(|| ClientError::transport("无法获取 window 对象").in_op("location"))?
        .location();
    let protocol = location.protocol().map_err(|e| js_error("location.protocol", e))?;
    let host = location.host().map_err(|e| js_error("location.host", e))?;
    Ok(PageOrigin::new(protocol == "https:", host))
}

/// 以 `new WebSocket(url)` 打开连接，返回刚创建的 socket
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserSocketConnector;

impl RealtimeConnector for BrowserSocketConnector {
    type Socket = web_sys::WebSocket;

    fn connect(&self, url: &str) -> ClientResult<web_sys::WebSocket> {
        web_sys::WebSocket::new(url).map_err(|e| js_error("websocket.new", e))
    }
}
