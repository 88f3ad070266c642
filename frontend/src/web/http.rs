//! fetch 传输层
//!
//! 使用 `web_sys::fetch` 实现 `Transport`，超时通过 `AbortController` 取消请求。

use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestCredentials, RequestInit, Response};

use crate::http::{HttpError, Transport, TransportRequest, TransportResponse};

/// 浏览器 fetch 传输
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

/// JS 异常 -> 可读文本
fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn build_request(req: &TransportRequest, controller: &AbortController) -> Result<Request, HttpError> {
    let headers = Headers::new().map_err(|e| {
        HttpError::RequestBuildFailed(format!("创建 Headers 失败: {}", js_message(&e)))
    })?;
    for (key, value) in &req.headers {
        headers.set(key, value).map_err(|e| {
            HttpError::RequestBuildFailed(format!("设置 Header 失败: {}", js_message(&e)))
        })?;
    }

    let opts = RequestInit::new();
    opts.set_method(req.method.as_str());
    opts.set_headers(&headers.into());
    opts.set_signal(Some(&controller.signal()));
    if req.with_credentials {
        opts.set_credentials(RequestCredentials::Include);
    }
    if let Some(body) = &req.body {
        opts.set_body(&JsValue::from_str(body));
    }

    Request::new_with_str_and_init(&req.url, &opts)
        .map_err(|e| HttpError::RequestBuildFailed(js_message(&e)))
}

async fn read_response(value: JsValue) -> Result<TransportResponse, HttpError> {
    let response: Response = value.dyn_into().map_err(|e| {
        HttpError::ResponseParseFailed(format!("Response 类型转换失败: {}", js_message(&e)))
    })?;

    let promise = response
        .text()
        .map_err(|e| HttpError::ResponseParseFailed(js_message(&e)))?;
    let text = JsFuture::from(promise)
        .await
        .map_err(|e| HttpError::ResponseParseFailed(js_message(&e)))?;

    Ok(TransportResponse {
        status: response.status(),
        body: text
            .as_string()
            .ok_or_else(|| HttpError::ResponseParseFailed("无法转换为字符串".to_string()))?,
    })
}

#[async_trait::async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, HttpError> {
        let window = web_sys::window()
            .ok_or_else(|| HttpError::NetworkError("无法获取 window 对象".to_string()))?;
        let controller = AbortController::new()
            .map_err(|e| HttpError::RequestBuildFailed(js_message(&e)))?;
        let request = build_request(&req, &controller)?;

        let fetch = JsFuture::from(window.fetch_with_request(&request));
        let timeout = TimeoutFuture::new(req.timeout_ms);

        match select(Box::pin(fetch), Box::pin(timeout)).await {
            Either::Left((Ok(value), _)) => read_response(value).await,
            Either::Left((Err(e), _)) => Err(HttpError::NetworkError(js_message(&e))),
            Either::Right(((), _)) => {
                controller.abort();
                Err(HttpError::Timeout(req.timeout_ms))
            }
        }
    }
}
