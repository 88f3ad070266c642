//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 守卫 -> 处理 -> 加载"的导航流程，守卫逻辑本身在 `guard` 中。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::guard;
use super::route::{Location, RouteMatch};
use crate::auth::SessionReader;

/// 请求管线在 401 时用来跳转的接口
pub trait Navigator {
    /// 当前完整路径（含查询参数）
    fn current_full_path(&self) -> String;
    /// 以 replace 方式导航（同样经过守卫）
    fn replace(&self, location: Location);
}

/// 获取当前浏览器地址
fn current_location() -> Location {
    web_sys::window()
        .map(|w| {
            let location = w.location();
            let path = location.pathname().unwrap_or_else(|_| "/".to_string());
            let search = location.search().unwrap_or_default();
            let hash = location.hash().unwrap_or_default();
            Location::parse(&format!("{}{}{}", path, search, hash))
        })
        .unwrap_or_else(|| Location::new("/"))
}

/// 推送 History 状态（内部工具函数），失败时返回 false
fn push_history_state(path: &str) -> bool {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return false;
    };
    match history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
        Ok(()) => true,
        Err(e) => {
            log_error!("[Router] pushState({}) 失败: {:?}", path, e);
            false
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向），失败时返回 false
fn replace_history_state(path: &str) -> bool {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return false;
    };
    match history.replace_state_with_url(&JsValue::NULL, "", Some(path)) {
        Ok(()) => true,
        Err(e) => {
            log_error!("[Router] replaceState({}) 失败: {:?}", path, e);
            false
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 守卫只依赖注入的只读会话，与认证模块解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由
    current: RwSignal<RouteMatch>,
    /// 会话读取句柄
    session: StoredValue<SessionReader>,
}

impl RouterService {
    /// 创建新的路由服务，首次加载同样经过守卫
    fn new(session: SessionReader) -> Self {
        let requested = current_location();
        let resolution = guard::resolve(requested, &session.snapshot());
        if resolution.redirected {
            replace_history_state(&resolution.route.full_path());
        }

        Self {
            current: RwSignal::new(resolution.route),
            session: StoredValue::new(session),
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<RouteMatch> {
        self.current.read_only()
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.navigate_to(Location::parse(path), true);
    }

    /// 导航到指定地址
    ///
    /// # Arguments
    /// * `target` - 目标地址
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to(&self, target: Location, use_push: bool) {
        let snapshot = self.session.with_value(|s| s.snapshot());
        let resolution = guard::resolve(target, &snapshot);
        let path = resolution.route.full_path();

        let committed = if use_push {
            push_history_state(&path)
        } else {
            replace_history_state(&path)
        };
        // 地址栏没有变化时不切换视图，保持两者一致
        if committed {
            self.current.set(resolution.route);
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let current = self.current;
        let session = self.session;

        let closure = Closure::<dyn Fn()>::new(move || {
            let snapshot = session.with_value(|s| s.snapshot());
            // popstate 时也执行守卫逻辑
            let resolution = guard::resolve(current_location(), &snapshot);
            if resolution.redirected {
                replace_history_state(&resolution.route.full_path());
            }
            current.set(resolution.route);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }
}

impl Navigator for RouterService {
    fn current_full_path(&self) -> String {
        self.current.with_untracked(|m| m.full_path())
    }

    fn replace(&self, location: Location) {
        self.navigate_to(location, false);
    }
}

/// 提供路由服务到 Context 并初始化
pub fn provide_router(session: SessionReader) -> RouterService {
    let router = RouterService::new(session);
    router.init_popstate_listener();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure the router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(&str) + Clone {
    let router = use_router();
    move |to: &str| {
        router.navigate(to);
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(RouteMatch) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接，点击时走路由服务而不是整页跳转
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let to_clone = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&to_clone);
    };

    view! {
        <a href=to on:click=on_click>
            {children()}
        </a>
    }
}
