//! 导航守卫
//!
//! `(AccessPolicy, SessionSnapshot) -> GuardDecision` 的纯函数，不依赖路由服务，
//! 路由服务在每次导航（push / replace / popstate / 首次加载）前调用 `resolve`。

use super::route::{
    AccessPolicy, DASHBOARD_PATH, Location, REDIRECT_QUERY_KEY, RouteMatch, match_location,
};
use crate::auth::SessionSnapshot;

/// 重定向最多跟随的次数
const MAX_REDIRECTS: usize = 4;

/// 守卫决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 按请求放行
    Allow,
    /// 未登录，跳转登录页并记录原目标
    RedirectToLogin { redirect: String },
    /// 已登录用户访问游客页，或非管理员访问管理页
    RedirectToDashboard,
}

impl GuardDecision {
    pub fn redirect_location(&self) -> Option<Location> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin { redirect } => Some(Location::login_with_redirect(redirect.clone())),
            Self::RedirectToDashboard => Some(Location::new(DASHBOARD_PATH)),
        }
    }
}

/// **核心守卫逻辑**
///
/// `intended` 是用户原本要访问的完整路径，用于登录后回跳。
pub fn evaluate(policy: AccessPolicy, session: &SessionSnapshot, intended: &str) -> GuardDecision {
    match policy {
        AccessPolicy::Authenticated | AccessPolicy::AdminOnly if !session.has_token() => {
            GuardDecision::RedirectToLogin {
                redirect: intended.to_string(),
            }
        }
        AccessPolicy::AdminOnly if !session.is_admin() => GuardDecision::RedirectToDashboard,
        AccessPolicy::Guest if session.has_token() => GuardDecision::RedirectToDashboard,
        _ => GuardDecision::Allow,
    }
}

/// 导航解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// 最终提交的路由
    pub route: RouteMatch,
    /// 是否发生过重定向
    pub redirected: bool,
}

/// 对目标地址执行守卫，并跟随重定向直到放行
pub fn resolve(target: Location, session: &SessionSnapshot) -> Resolution {
    let mut route = match_location(&target);
    let mut redirected = false;

    for _ in 0..MAX_REDIRECTS {
        let decision = evaluate(route.policy(), session, &route.full_path());
        let Some(next) = decision.redirect_location() else {
            return Resolution { route, redirected };
        };
        log_info!("[Router] {} -> {} ({:?})", route.full_path(), next, decision);
        route = match_location(&next);
        redirected = true;
    }

    log_error!("[Router] Redirect limit reached at {}", route.full_path());
    Resolution { route, redirected }
}

/// 登录成功后的跳转目标
///
/// 只接受站内路径，其余情况回到控制台。
/// 浏览器把 `\` 当作 `/`，所以 `/\host` 与 `//host` 一样是外部地址。
pub fn post_login_target(login: &Location) -> String {
    match login.query_value(REDIRECT_QUERY_KEY) {
        Some(target) if is_in_app_path(target) => target.to_string(),
        _ => DASHBOARD_PATH.to_string(),
    }
}

fn is_in_app_path(target: &str) -> bool {
    let mut chars = target.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/') | Some('\\'))
}
