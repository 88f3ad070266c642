//! 请求错误类型

/// 传输层错误（没有拿到响应信封）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// 请求构建失败
    RequestBuildFailed(String),
    /// 网络请求失败
    NetworkError(String),
    /// 请求超时（毫秒）
    Timeout(u32),
    /// 非 2xx 的 HTTP 状态码
    Status(u16),
    /// 响应解析失败
    ResponseParseFailed(String),
}

impl core::fmt::Display for HttpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HttpError::RequestBuildFailed(msg) => write!(f, "请求构建失败: {}", msg),
            HttpError::NetworkError(msg) => write!(f, "网络错误: {}", msg),
            HttpError::Timeout(ms) => write!(f, "请求超时 ({} ms)", ms),
            HttpError::Status(code) => write!(f, "请求失败，状态码 {}", code),
            HttpError::ResponseParseFailed(msg) => write!(f, "响应解析失败: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// 信封错误的兜底提示
pub const FALLBACK_ENVELOPE_MESSAGE: &str = "系统错误";
/// 传输错误的兜底提示
pub const FALLBACK_TRANSPORT_MESSAGE: &str = "请求错误";

/// API 调用错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 信封 code 不是 200（也不是 401）
    Rejected { code: i64, message: String },
    /// 信封 code 为 401
    Unauthorized { message: String },
    /// 响应体不是合法的信封
    MalformedEnvelope(String),
    /// 信封成功，但 data 与期望的类型不符
    Decode(String),
    /// 请求参数无法序列化
    Encode(String),
    /// 传输层失败
    Transport(HttpError),
}

impl ApiError {
    /// 展示给用户的消息
    pub fn user_message(&self) -> String {
        let message = match self {
            ApiError::Rejected { message, .. } | ApiError::Unauthorized { message } => {
                message.clone()
            }
            ApiError::MalformedEnvelope(_) | ApiError::Decode(_) => String::new(),
            ApiError::Encode(msg) => msg.clone(),
            ApiError::Transport(e) => e.to_string(),
        };

        if !message.trim().is_empty() {
            return message;
        }
        match self {
            ApiError::Encode(_) | ApiError::Transport(_) => FALLBACK_TRANSPORT_MESSAGE.to_string(),
            _ => FALLBACK_ENVELOPE_MESSAGE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ApiError::Rejected { code, message } => write!(f, "[{}] {}", code, message),
            ApiError::Unauthorized { message } => write!(f, "[401] {}", message),
            ApiError::MalformedEnvelope(msg) => write!(f, "响应不是合法的信封: {}", msg),
            ApiError::Decode(msg) => write!(f, "数据解析失败: {}", msg),
            ApiError::Encode(msg) => write!(f, "请求参数序列化失败: {}", msg),
            ApiError::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        ApiError::Transport(e)
    }
}
