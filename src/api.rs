use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::realtime::{self, PageOrigin, RealtimeConnector};
use crate::request::{HttpClient, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::stream::RestartStream;
use futures::StreamExt;
use sms_admin_shared::protocol::{LOGIN, RESTART_SMSD, SEND_TEST_SMS, SMS_FILES};
use sms_admin_shared::{
    ErrorBody, HEADER_AUTHORIZATION, ListQuery, LoginResponse, SendTestSmsResult, SmsFile,
    SmsFileListing,
};
use tracing::{debug, info, warn};


const LOGIN_FAILED: &str = "Login failed";
const FETCH_FILES_FAILED: &str = "Failed to fetch files";
const READ_FILE_FAILED: &str = "Failed to read file";
const SEND_TEST_FAILED: &str = "Failed to send test SMS";
const RESTART_FAILED: &str = "Failed to restart smsd";

/// 管理后台 API 客户端
///
/// 持有唯一的会话（token）。所有受保护接口：
/// - 附带 `Authorization: Bearer <token>`
/// - 401 时清除 token 并返回 `Unauthorized`，UI 据此跳转登录页
/// - 其余非 2xx 返回各接口固定的失败消息
/// - 成功时原样返回服务端 JSON
pub struct SmsAdminApi<C: HttpClient, S: KeyValueStore> {
    client: C,
    session: Session<S>,
    config: ClientConfig,
}

impl<C: HttpClient, S: KeyValueStore> SmsAdminApi<C, S> {
    pub fn new(client: C, store: S, config: ClientConfig) -> Self {
        let session = Session::new(store, config.token_key.clone());
        Self {
            client,
            session,
            config,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // --- 会话 ---

    pub fn get_token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn set_token(&self, token: &str) -> bool {
        self.session.set_token(token)
    }

    pub fn clear_token(&self) {
        self.session.clear_token();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    // --- 接口 ---

    /// 用管理密钥换取 token 并保存
    pub async fn login(&self, admin_key: &str) -> ClientResult<String> {
        let req = HttpRequest::new(&self.config.url(LOGIN.path), LOGIN.method)
            .with_form(&[("admin_key", admin_key)]);

        let res = self
            .client
            .send(req)
            .await
            .map_err(|e| e.in_op("api.login"))?;

        if !res.ok() {
            let status = res.status;
            // 错误体不是 JSON 时同样退回通用消息
            let detail = res
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!(status, detail = %detail, "admin login rejected");
            return Err(ClientError::login_failed(detail)
                .with_status(status)
                .in_op("api.login"));
        }

        let data: LoginResponse = res.json().await.map_err(|e| e.in_op("api.login"))?;
        if self.session.set_token(&data.token) {
            info!("admin login succeeded");
        } else {
            // token 仍返回给调用方，但刷新页面后需要重新登录
            warn!("admin login succeeded but token could not be persisted");
        }
        Ok(data.token)
    }

    /// 列出目录中的文件；排序、搜索、分页全部由服务端完成
    pub async fn fetch_sms_files(
        &self,
        folder: impl AsRef<str>,
        query: &ListQuery,
    ) -> ClientResult<SmsFileListing> {
        let folder = folder.as_ref();
        let url = format!(
            "{}/{}",
            self.config.url(SMS_FILES.path),
            urlencoding::encode(folder)
        );
        let req = HttpRequest::new(&url, SMS_FILES.method).with_query(&query.to_pairs());

        let res = self
            .send_authorized(req, FETCH_FILES_FAILED)
            .await
            .map_err(|e| e.in_op_with("api.fetch_sms_files", folder))?;
        res.json()
            .await
            .map_err(|e| e.in_op_with("api.fetch_sms_files", folder))
    }

    /// 使用配置中的默认查询条件
    pub async fn fetch_sms_files_default(
        &self,
        folder: impl AsRef<str>,
    ) -> ClientResult<SmsFileListing> {
        self.fetch_sms_files(folder, &self.config.default_query).await
    }

    pub async fn fetch_sms_file(
        &self,
        folder: impl AsRef<str>,
        filename: &str,
    ) -> ClientResult<SmsFile> {
        let folder = folder.as_ref();
        let url = format!(
            "{}/{}/{}",
            self.config.url(SMS_FILES.path),
            urlencoding::encode(folder),
            urlencoding::encode(filename)
        );
        let req = HttpRequest::new(&url, SMS_FILES.method);

        let res = self
            .send_authorized(req, READ_FILE_FAILED)
            .await
            .map_err(|e| e.in_op_with("api.fetch_sms_file", filename))?;
        res.json()
            .await
            .map_err(|e| e.in_op_with("api.fetch_sms_file", filename))
    }

    pub async fn send_test_sms(
        &self,
        phone: &str,
        message: &str,
    ) -> ClientResult<SendTestSmsResult> {
        let req = HttpRequest::new(&self.config.url(SEND_TEST_SMS.path), SEND_TEST_SMS.method)
            .with_form(&[("phone", phone), ("message", message)]);

        let res = self
            .send_authorized(req, SEND_TEST_FAILED)
            .await
            .map_err(|e| e.in_op("api.send_test_sms"))?;
        res.json().await.map_err(|e| e.in_op("api.send_test_sms"))
    }

    /// 触发 smsd 重启，返回实时日志流
    ///
    /// 只检查初始响应状态；之后的传输错误由流本身产出。
    pub async fn restart_smsd(&self) -> ClientResult<RestartStream> {
        let req = HttpRequest::new(&self.config.url(RESTART_SMSD.path), RESTART_SMSD.method);

        let res = self
            .send_authorized(req, RESTART_FAILED)
            .await
            .map_err(|e| e.in_op("api.restart_smsd"))?;
        info!("smsd restart started");
        Ok(RestartStream::new(res.into_body()))
    }

    /// 回调形式：每收到一块日志调用一次 `on_chunk`，流结束后返回
    pub async fn restart_smsd_with<F>(&self, mut on_chunk: F) -> ClientResult<()>
    where
        F: FnMut(&str),
    {
        let mut stream = self.restart_smsd().await?;
        while let Some(chunk) = stream.next().await {
            on_chunk(&chunk?);
        }
        debug!("smsd restart stream finished");
        Ok(())
    }

    // --- 实时推送 ---

    /// 由配置中的 base_url 推导 WebSocket 来源（原生端使用；浏览器中见 `web::page_origin`）
    pub fn origin(&self) -> ClientResult<PageOrigin> {
        PageOrigin::from_base_url(&self.config.base_url)
    }

    pub fn websocket_url(&self, origin: &PageOrigin) -> String {
        realtime::websocket_url(origin, self.session.token().as_deref())
    }

    /// 只负责构造连接，不处理重连与消息
    pub fn create_websocket<R: RealtimeConnector>(
        &self,
        connector: &R,
        origin: &PageOrigin,
    ) -> ClientResult<R::Socket> {
        let url = self.websocket_url(origin);
        debug!(host = %origin.host, secure = origin.secure, "opening realtime socket");
        connector
            .connect(&url)
            .map_err(|e| e.in_op("api.create_websocket"))
    }

    // --- 内部 ---

    /// 附带 token 发送请求，并统一处理 401 与非 2xx
    async fn send_authorized(
        &self,
        req: HttpRequest,
        failure: &str,
    ) -> ClientResult<HttpResponse> {
        // 没有 token 不必请求服务端
        let Some(bearer) = self.session.bearer() else {
            debug!(url = %req.url, "no admin token, skipping request");
            return Err(ClientError::unauthorized().in_op("api.authorize"));
        };

        debug!(method = req.method.as_str(), url = %req.url, "sending admin request");
        let req = req.with_header(HEADER_AUTHORIZATION, &bearer);
        let res = self.client.send(req).await?;

        if res.status == 401 {
            warn!("admin token rejected, clearing session");
            self.session.clear_token();
            return Err(ClientError::unauthorized());
        }
        if !res.ok() {
            return Err(ClientError::request_failed(failure, res.status));
        }
        Ok(res)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<S: KeyValueStore> SmsAdminApi<crate::request::ReqwestHttpClient, S> {
    /// 原生端快捷构造
    pub fn with_reqwest(store: S, config: ClientConfig) -> Self {
        Self::new(crate::request::ReqwestHttpClient::new(), store, config)
    }
}
