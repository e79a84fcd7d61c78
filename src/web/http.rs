//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现 `HttpClient`。响应体通过 `ReadableStream`
//! 逐块读取，重启日志因此可以边到达边展示。

use crate::error::{ClientError, ClientResult};
use crate::request::{BodyStream, HttpClient, HttpRequest, HttpResponse};
use futures::StreamExt;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, ReadableStreamDefaultReader, Request, RequestInit, Response};

/// JS 异常转为传输错误
pub(crate) fn js_error(operation: &str, e: JsValue) -> ClientError {
    let msg = e.as_string().unwrap_or_else(|| format!("{:?}", e));
    ClientError::transport(msg).in_op(operation)
}

/// 基于 `window.fetch` 的客户端
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchHttpClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let headers = Headers::new().map_err(|e| js_error("fetch.headers", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| js_error("fetch.headers", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&req.url, &opts).map_err(|e| {
            ClientError::invalid_input(format!("{:?}", e)).in_op_with("fetch.request", &req.url)
        })?;

        let window = web_sys::window()
            .ok_or_else(|| ClientError::transport("无法获取 window 对象").in_op("fetch.window"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| js_error("fetch.send", e))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| js_error("fetch.response", e))?;

        let status = response.status();
        Ok(HttpResponse::new(status, body_stream(&response)))
    }
}

/// 把 `Response.body` 转为字节块流；没有响应体时为空流
fn body_stream(response: &Response) -> BodyStream {
    let Some(body) = response.body() else {
        return futures::stream::empty().boxed_local();
    };
    let reader: ReadableStreamDefaultReader = body.get_reader().unchecked_into();

    futures::stream::unfold(Some(reader), |state| async move {
        let reader = state?;
        match read_chunk(&reader).await {
            Ok(Some(bytes)) => Some((Ok(bytes), Some(reader))),
            Ok(None) => None,
            // 出错后结束流
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed_local()
}

/// 读取一块；`Ok(None)` 表示流已结束
async fn read_chunk(reader: &ReadableStreamDefaultReader) -> ClientResult<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read())
        .await
        .map_err(|e| js_error("fetch.body", e))?;

    let done = js_sys::Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(|e| js_error("fetch.body", e))?
        .as_bool()
        .unwrap_or(true);
    if done {
        return Ok(None);
    }

    let value = js_sys::Reflect::get(&result, &JsValue::from_str("value"))
        .map_err(|e| js_error("fetch.body", e))?;
    Ok(Some(js_sys::Uint8Array::new(&value).to_vec()))
}
