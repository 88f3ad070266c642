//! HTTP 请求管线
//!
//! 请求流程：默认请求头 -> 请求阶段(RequestStage) -> 传输(Transport)
//! -> 信封解析 -> 失败阶段(FailureStage)。
//! 每个横切关注点（鉴权头、错误提示、401 处理）都是一个具名阶段，可以单独测试。

mod error;
pub mod stages;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use image_hosting_shared::Envelope;
use image_hosting_shared::protocol::HttpMethod;
use leptos::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;

pub use error::{ApiError, FALLBACK_ENVELOPE_MESSAGE, FALLBACK_TRANSPORT_MESSAGE, HttpError};
pub use stages::{BearerAuth, ExpireSession, NotifyFailure};

// =========================================================
// 请求 / 响应模型
// =========================================================

/// 经过管线处理的请求（路径相对于 API 前缀）
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutgoingRequest {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// 读取请求头（不区分大小写）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 设置请求头，已存在则覆盖
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }
}

/// 交给传输层的请求
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout_ms: u32,
    pub with_credentials: bool,
}

/// 传输层响应
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// 传输层抽象
///
/// (?Send) 是因为浏览器环境下的 Future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait Transport {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, HttpError>;
}

/// 发送前对请求做修改的阶段
pub trait RequestStage {
    fn name(&self) -> &'static str;
    fn apply(&self, request: &mut OutgoingRequest);
}

/// 请求失败后执行的阶段
pub trait FailureStage {
    fn name(&self) -> &'static str;
    fn on_failure(&self, request: &OutgoingRequest, error: &ApiError);
}

// =========================================================
// 客户端
// =========================================================

type SharedRequestStage = Arc<dyn RequestStage + Send + Sync>;
type SharedFailureStage = Arc<dyn FailureStage + Send + Sync>;

/// API 客户端
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport + Send + Sync>,
    request_stages: Arc<[SharedRequestStage]>,
    failure_stages: Arc<[SharedFailureStage]>,
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Arc<dyn Transport + Send + Sync>,
    request_stages: Vec<SharedRequestStage>,
    failure_stages: Vec<SharedFailureStage>,
}

impl ApiClientBuilder {
    pub fn request_stage(mut self, stage: impl RequestStage + Send + Sync + 'static) -> Self {
        self.request_stages.push(Arc::new(stage));
        self
    }

    pub fn failure_stage(mut self, stage: impl FailureStage + Send + Sync + 'static) -> Self {
        self.failure_stages.push(Arc::new(stage));
        self
    }

    pub fn build(self) -> ApiClient {
        ApiClient {
            config: Arc::new(self.config),
            transport: self.transport,
            request_stages: self.request_stages.into(),
            failure_stages: self.failure_stages.into(),
        }
    }
}

impl ApiClient {
    pub fn builder(
        config: ClientConfig,
        transport: impl Transport + Send + Sync + 'static,
    ) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            transport: Arc::new(transport),
            request_stages: Vec::new(),
            failure_stages: Vec::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 阶段名称，按执行顺序
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.request_stages
            .iter()
            .map(|s| s.name())
            .chain(self.failure_stages.iter().map(|s| s.name()))
            .collect()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.dispatch(HttpMethod::Get, path, params).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.dispatch(HttpMethod::Post, path, body).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.dispatch(HttpMethod::Put, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.dispatch(HttpMethod::Delete, path, params).await
    }

    /// GET / DELETE 的参数进查询串，其余进请求体
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &impl Serialize,
    ) -> Result<T, ApiError> {
        let mut request = OutgoingRequest::new(method, path);
        let encoded = if method.uses_query() {
            to_query(payload).map(|query| request.query = query)
        } else {
            to_body(payload).map(|body| request.body = body)
        };

        match encoded {
            Ok(()) => self.send(request).await,
            Err(e) => {
                self.run_failure_stages(&request, &e);
                Err(e)
            }
        }
    }

    /// **核心方法：执行完整管线**
    pub async fn send<T: DeserializeOwned>(&self, mut request: OutgoingRequest) -> Result<T, ApiError> {
        let mut headers = self.config.default_headers.clone();
        headers.retain(|(k, _)| request.header(k).is_none());
        headers.append(&mut request.headers);
        request.headers = headers;

        for stage in self.request_stages.iter() {
            stage.apply(&mut request);
        }

        let transport_request = TransportRequest {
            method: request.method,
            url: self.url_with_query(&request),
            headers: request.headers.clone(),
            body: request.body.clone(),
            timeout_ms: self.config.timeout_ms,
            with_credentials: self.config.with_credentials,
        };

        let result = match self.transport.send(transport_request).await {
            Ok(response) => decode_envelope(response),
            Err(e) => Err(ApiError::Transport(e)),
        };

        if let Err(e) = &result {
            self.run_failure_stages(&request, e);
        }
        result
    }

    fn run_failure_stages(&self, request: &OutgoingRequest, error: &ApiError) {
        log_warn!(
            "[Http] {} {} failed: {}",
            request.method.as_str(),
            request.path,
            error
        );
        for stage in self.failure_stages.iter() {
            stage.on_failure(request, error);
        }
    }

    fn url_with_query(&self, request: &OutgoingRequest) -> String {
        let url = self.config.url(&request.path);
        if request.query.is_empty() {
            return url;
        }
        let mut location = crate::web::route::Location::new(url);
        location.query = request.query.clone();
        location.full_path()
    }
}

/// 解析信封：只有 code 200 视为成功
pub fn decode_envelope<T: DeserializeOwned>(response: TransportResponse) -> Result<T, ApiError> {
    if !(200..300).contains(&response.status) {
        return Err(ApiError::Transport(HttpError::Status(response.status)));
    }

    let envelope: Envelope<Value> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::MalformedEnvelope(e.to_string()))?;

    if envelope.is_success() {
        return serde_json::from_value(envelope.data.unwrap_or(Value::Null))
            .map_err(|e| ApiError::Decode(e.to_string()));
    }

    let code = envelope.code;
    let unauthorized = envelope.is_unauthorized();
    let message = envelope
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ENVELOPE_MESSAGE.to_string());

    if unauthorized {
        Err(ApiError::Unauthorized { message })
    } else {
        Err(ApiError::Rejected { code, message })
    }
}

/// 参数对象 -> 查询串；`null` 字段被忽略
fn to_query(params: &impl Serialize) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params).map_err(|e| ApiError::Encode(e.to_string()))?;
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(ApiError::Encode(format!(
                "查询参数必须是对象，实际为 {}",
                other
            )));
        }
    };

    let mut query = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    query.push((key.clone(), scalar_to_string(item)));
                }
            }
            other => query.push((key, scalar_to_string(other))),
        }
    }
    Ok(query)
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn to_body(body: &impl Serialize) -> Result<Option<String>, ApiError> {
    let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(value.to_string()))
}

/// 从 Context 获取 API 客户端
pub fn use_api() -> ApiClient {
    use_context::<ApiClient>().expect("ApiClient should be provided")
}
