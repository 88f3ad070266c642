//! 管线阶段

use image_hosting_shared::protocol::LOGIN_PATH;

use super::{ApiError, FailureStage, OutgoingRequest, RequestStage};
use crate::auth::{Session, SessionReader};
use crate::toast::Notifier;
use crate::web::route::Location;
use crate::web::router::Navigator;

/// 为除登录接口外的所有请求附加 `Authorization: Bearer <token>`
pub struct BearerAuth {
    session: SessionReader,
    exempt_path: String,
}

impl BearerAuth {
    pub fn new(session: SessionReader) -> Self {
        Self {
            session,
            exempt_path: LOGIN_PATH.to_string(),
        }
    }
}

impl RequestStage for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer-auth"
    }

    fn apply(&self, request: &mut OutgoingRequest) {
        if request.path == self.exempt_path {
            return;
        }
        // 没有 token 不是错误，直接不加请求头
        if let Some(token) = self.session.token() {
            request.set_header("Authorization", &format!("Bearer {}", token));
        }
    }
}

/// 每次失败弹出一条错误提示
pub struct NotifyFailure<N> {
    notifier: N,
}

impl<N: Notifier> NotifyFailure<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }
}

impl<N: Notifier> FailureStage for NotifyFailure<N> {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn on_failure(&self, _request: &OutgoingRequest, error: &ApiError) {
        self.notifier.error(&error.user_message());
    }
}

/// 401：清除 token，并带上当前地址跳转登录页
pub struct ExpireSession<R> {
    session: Session,
    navigator: R,
}

impl<R: Navigator> ExpireSession<R> {
    pub fn new(session: Session, navigator: R) -> Self {
        Self { session, navigator }
    }
}

impl<R: Navigator> FailureStage for ExpireSession<R> {
    fn name(&self) -> &'static str {
        "expire-session"
    }

    fn on_failure(&self, _request: &OutgoingRequest, error: &ApiError) {
        if !error.is_unauthorized() {
            return;
        }
        self.session.expire();
        let current = self.navigator.current_full_path();
        self.navigator.replace(Location::login_with_redirect(current));
    }
}
