//! 客户端配置
//!
//! CSR 应用没有运行时环境变量，默认值写在常量里，
//! 构建时可以通过环境变量覆盖（Trunk 构建时读取）。

/// 默认 API 前缀
const DEFAULT_API_BASE: &str = "/api";
/// 默认请求超时（毫秒）
const DEFAULT_TIMEOUT_MS: u32 = 10_000;

pub const CONTENT_TYPE: &str = "application/json;charset=utf-8";
pub const REQUESTED_WITH: &str = "XMLHttpRequest";

/// HTTP 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// 所有请求的路径前缀
    pub base_path: String,
    /// 单次请求超时
    pub timeout_ms: u32,
    /// 跨域请求是否携带 Cookie
    pub with_credentials: bool,
    /// 每个请求都会携带的请求头
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            with_credentials: true,
            default_headers: vec![
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                ("X-Requested-With".to_string(), REQUESTED_WITH.to_string()),
            ],
        }
    }
}

impl ClientConfig {
    /// 读取构建时覆盖项：`IMAGE_HOSTING_API_BASE` / `IMAGE_HOSTING_API_TIMEOUT_MS`
    pub fn from_build_env() -> Self {
        Self::with_overrides(
            option_env!("IMAGE_HOSTING_API_BASE"),
            option_env!("IMAGE_HOSTING_API_TIMEOUT_MS"),
        )
    }

    fn with_overrides(base: Option<&str>, timeout: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) {
            config.base_path = base.trim_end_matches('/').to_string();
        }
        if let Some(ms) = timeout.and_then(|t| t.trim().parse::<u32>().ok()) {
            config.timeout_ms = ms;
        }
        config
    }

    /// 拼接完整 URL
    pub fn url(&self, path: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.base_path, "/api");
        assert_eq!(config.timeout_ms, 10_000);
        assert!(config.with_credentials);
        assert_eq!(config.url("/login"), "/api/login");
        assert_eq!(config.url("user/info"), "/api/user/info");
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let config = ClientConfig::with_overrides(Some("https://img.example.com/api/"), Some("abc"));
        assert_eq!(config.base_path, "https://img.example.com/api");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.url("/images"), "https://img.example.com/api/images");

        let config = ClientConfig::with_overrides(Some("  "), Some("2500"));
        assert_eq!(config.base_path, "/api");
        assert_eq!(config.timeout_ms, 2500);
    }
}
