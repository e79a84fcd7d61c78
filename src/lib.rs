//! SMS 网关管理后台客户端
//!
//! 分层：
//! - `storage` / `session`: token 的存取（键值存储抽象）
//! - `request`: HTTP 传输抽象，原生端由 reqwest 实现
//! - `api`: 管理接口（登录、文件列表、测试短信、重启 smsd）
//! - `stream`: 重启日志流
//! - `realtime`: WebSocket 地址与事件
//! - `web`: 浏览器绑定（仅 wasm32）

pub mod api;
pub mod config;
pub mod error;
pub mod realtime;
pub mod request;
pub mod session;
pub mod storage;
pub mod stream;

// 浏览器原生 Web API 封装
// 直接使用 web_sys，不引入 gloo-* 系列 crate。
#[cfg(target_arch = "wasm32")]
pub mod web {
    mod http;
    mod socket;
    mod storage;

    pub use http::FetchHttpClient;
    pub use socket::{BrowserSocketConnector, page_origin};
    pub use storage::LocalStorage;

    /// 浏览器端的完整客户端
    pub type BrowserApi = crate::api::SmsAdminApi<FetchHttpClient, LocalStorage>;

    /// 使用同源相对路径与默认 token 键构造
    pub fn browser_api() -> BrowserApi {
        BrowserApi::new(
            FetchHttpClient,
            LocalStorage,
            crate::config::ClientConfig::default(),
        )
    }
}

pub use api::SmsAdminApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientErrorKind, ClientResult};
pub use realtime::{PageOrigin, RealtimeConnector, parse_realtime_event, websocket_url};
#[cfg(not(target_arch = "wasm32"))]
pub use request::ReqwestHttpClient;
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use session::Session;
pub use storage::{KeyValueStore, MemoryStore};
pub use stream::RestartStream;

pub use sms_admin_shared as shared;
pub use sms_admin_shared::protocol::RealtimeEvent;
pub use sms_admin_shared::{
    Folder, ListQuery, SendTestSmsResult, SmsFile, SmsFileEntry, SmsFileListing, SortBy,
    SortOrder,
};
