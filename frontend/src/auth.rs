//! 认证模块
//!
//! 会话状态（token + 用户信息）持久化在键值存储中，只有 `Session` 可以写入。
//! 路由守卫和请求管线只持有 `SessionReader`，每次读取都拿到一份快照。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use image_hosting_shared::{LoginRequest, STORAGE_TOKEN_KEY, STORAGE_USER_KEY, UserInfo};
use image_hosting_shared::protocol::CurrentUserRequest;
use leptos::prelude::*;

use crate::api;
use crate::http::{ApiClient, ApiError};

/// 持久化键值存储
///
/// 浏览器中由 `LocalStorage` 实现，测试和无痕模式下由 `MemoryStore` 实现。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}

type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

/// 内存键值存储
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .lock()
            .map(|mut e| e.insert(key.to_string(), value.to_string()))
            .is_ok()
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.lock().map(|mut e| e.remove(key)).is_ok()
    }
}

/// 某一时刻的会话快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserInfo>,
}

impl SessionSnapshot {
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserInfo::is_admin)
    }
}

/// 只读会话句柄
#[derive(Clone)]
pub struct SessionReader {
    store: SharedStore,
}

impl SessionReader {
    pub fn token(&self) -> Option<String> {
        self.store.get(STORAGE_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// 读取 token 和用户信息
    ///
    /// 用户信息解析失败时视为未登录用户，仅记录日志。
    pub fn snapshot(&self) -> SessionSnapshot {
        let user = self
            .store
            .get(STORAGE_USER_KEY)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match serde_json::from_str::<UserInfo>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log_warn!("[Session] 解析用户信息失败: {}", e);
                    None
                }
            });

        SessionSnapshot {
            token: self.token(),
            user,
        }
    }
}

/// 会话所有者，唯一的写入方
#[derive(Clone)]
pub struct Session {
    store: SharedStore,
}

impl Session {
    pub fn new(store: impl KeyValueStore + Send + Sync + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn reader(&self) -> SessionReader {
        SessionReader {
            store: self.store.clone(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.reader().snapshot()
    }

    /// 登录成功后写入 token 和用户信息
    ///
    /// 任一写入失败都返回 false，且不会留下只有 token 的半截会话。
    pub fn sign_in(&self, token: &str, user: &UserInfo) -> bool {
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                log_error!("[Session] 序列化用户信息失败: {}", e);
                return false;
            }
        };
        if !self.store.set(STORAGE_TOKEN_KEY, token) {
            log_error!("[Session] 保存 token 失败");
            return false;
        }
        if !self.store.set(STORAGE_USER_KEY, &user_json) {
            log_error!("[Session] 保存用户信息失败，回滚 token");
            self.store.delete(STORAGE_TOKEN_KEY);
            return false;
        }
        log_info!("[Session] Signed in as '{}'.", user.display_name());
        true
    }

    /// 刷新用户信息，token 保持不变
    pub fn update_user(&self, user: &UserInfo) -> bool {
        let saved = serde_json::to_string(user)
            .map(|json| self.store.set(STORAGE_USER_KEY, &json))
            .unwrap_or(false);
        if !saved {
            log_error!("[Session] 保存用户信息失败");
        }
        saved
    }

    /// token 失效：只清除 token，用户信息保留
    pub fn expire(&self) {
        self.store.delete(STORAGE_TOKEN_KEY);
        log_info!("[Session] Token expired and cleared.");
    }

    /// 注销：清除全部会话数据
    pub fn sign_out(&self) {
        self.store.delete(STORAGE_TOKEN_KEY);
        self.store.delete(STORAGE_USER_KEY);
        log_info!("[Session] Signed out.");
    }
}

/// 从 Context 获取会话
pub fn use_session() -> Session {
    use_context::<Session>().expect("Session should be provided")
}

/// 会话保存失败时的提示
pub const SESSION_SAVE_FAILED: &str = "登录状态保存失败，请检查浏览器存储设置";

/// 登录流程错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 接口调用失败（请求管线已经提示过）
    Api(ApiError),
    /// 会话写入失败（存储已满或被禁用）
    Storage,
}

impl AuthError {
    /// 请求管线没有提示过的错误才需要页面自己提示
    pub fn local_notice(&self) -> Option<&'static str> {
        match self {
            AuthError::Api(_) => None,
            AuthError::Storage => Some(SESSION_SAVE_FAILED),
        }
    }
}

impl core::fmt::Display for AuthError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AuthError::Api(e) => write!(f, "{}", e),
            AuthError::Storage => f.write_str(SESSION_SAVE_FAILED),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Api(e) => Some(e),
            AuthError::Storage => None,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(e: ApiError) -> Self {
        AuthError::Api(e)
    }
}

/// 登录并保存会话
pub async fn login(
    client: &ApiClient,
    session: &Session,
    request: LoginRequest,
) -> Result<UserInfo, AuthError> {
    let response = api::call(client, &request).await?;
    if !session.sign_in(&response.token, &response.user) {
        return Err(AuthError::Storage);
    }
    Ok(response.user)
}

/// 从后端重新拉取当前用户并更新本地缓存
pub async fn refresh_user(client: &ApiClient, session: &Session) -> Result<UserInfo, AuthError> {
    let user = api::call(client, &CurrentUserRequest).await?;
    if !session.update_user(&user) {
        return Err(AuthError::Storage);
    }
    Ok(user)
}

/// 注销并清除状态
pub fn logout(session: &Session) {
    session.sign_out();
}
