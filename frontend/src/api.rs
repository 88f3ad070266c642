use image_hosting_shared::protocol::{ApiRequest, HttpMethod};

use crate::http::{ApiClient, ApiError};

/// 按端点描述调用后端接口
pub async fn call<R: ApiRequest>(client: &ApiClient, request: &R) -> Result<R::Response, ApiError> {
    match R::METHOD {
        HttpMethod::Get => client.get(R::PATH, request).await,
        HttpMethod::Post => client.post(R::PATH, request).await,
        HttpMethod::Put => client.put(R::PATH, request).await,
        HttpMethod::Delete => client.delete(R::PATH, request).await,
    }
}
