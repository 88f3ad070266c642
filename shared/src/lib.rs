//! 前后端共享的数据模型
//!
//! - 持久化会话使用的存储键
//! - 后端统一响应信封 `Envelope`
//! - 用户、登录、注册等传输对象

use serde::{Deserialize, Serialize};

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// LocalStorage 中保存 Bearer Token 的键
pub const STORAGE_TOKEN_KEY: &str = "token";
/// LocalStorage 中保存用户信息 (JSON) 的键
pub const STORAGE_USER_KEY: &str = "user";

/// 管理员角色标识
pub const ROLE_ADMIN: i32 = 1;
/// 普通用户角色标识
pub const ROLE_USER: i32 = 0;

// =========================================================
// 统一响应 (Envelope)
// =========================================================

/// 后端返回的结果码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    Failed,
    Unauthorized,
    Forbidden,
    NotFound,
    SystemError,
}

impl ResultCode {
    pub const fn code(&self) -> i64 {
        match self {
            ResultCode::Success => 200,
            ResultCode::Failed => 400,
            ResultCode::Unauthorized => 401,
            ResultCode::Forbidden => 403,
            ResultCode::NotFound => 404,
            ResultCode::SystemError => 500,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            200 => Some(ResultCode::Success),
            400 => Some(ResultCode::Failed),
            401 => Some(ResultCode::Unauthorized),
            403 => Some(ResultCode::Forbidden),
            404 => Some(ResultCode::NotFound),
            500 => Some(ResultCode::SystemError),
            _ => None,
        }
    }

    /// 后端对该结果码的默认描述
    pub const fn default_message(&self) -> &'static str {
        match self {
            ResultCode::Success => "操作成功",
            ResultCode::Failed => "操作失败",
            ResultCode::Unauthorized => "未授权",
            ResultCode::Forbidden => "禁止访问",
            ResultCode::NotFound => "数据不存在",
            ResultCode::SystemError => "系统错误",
        }
    }
}

/// 统一响应信封 `{ code, message, data }`
///
/// `data` 缺失或为 `null` 时保持为 `None`，由调用方决定如何解释。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success.code()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == ResultCode::Unauthorized.code()
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 用户信息，登录后以 JSON 形式保存在 `user` 键下
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// 角色类型（0 普通用户，1 管理员）
    #[serde(default)]
    pub role_type: Option<i32>,
    /// 帐号状态（0 正常，1 禁用）
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.role_type == Some(ROLE_ADMIN)
    }

    /// 用于界面展示的名称：优先昵称，其次用户名
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.username.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
