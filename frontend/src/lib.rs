//! 图床管理系统前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route` / `web::guard`: 路由表与守卫（纯逻辑，可在原生环境测试）
//! - `web::router`: 路由服务（History API 封装）
//! - `auth`: 会话状态，`Session` 唯一写入，其余模块只读
//! - `http`: 请求管线（鉴权头 -> 传输 -> 信封解析 -> 失败处理）
//! - `components`: UI 组件层

// =========================================================
// 条件编译日志宏
// =========================================================
#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn {
    ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into()))
}
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn {
    ($($t:tt)*) => (eprintln!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

pub mod api;
pub mod auth;
pub mod clipboard;
pub mod config;
pub mod http;
pub mod toast;
mod components {
    pub mod dashboard;
    pub mod login;
}

// 原生 Web API 封装模块
pub mod web;

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::auth::{MemoryStore, Session};
use crate::components::dashboard::{DashboardLayout, dashboard_page};
use crate::components::login::{LoginPage, RegisterPage};
use crate::config::ClientConfig;
use crate::http::{ApiClient, BearerAuth, ExpireSession, NotifyFailure};
use crate::toast::{ToastContext, ToastHost};
use crate::web::route::{DASHBOARD_PATH, LOGIN_PATH, RouteMatch, RouteName};
use crate::web::router::{Link, RouterOutlet, provide_router};
use crate::web::{FetchTransport, LocalStorage};

/// 路由匹配函数
///
/// 根据匹配到的路由名返回对应的视图组件。
fn route_matcher(route: RouteMatch) -> AnyView {
    match route.name {
        RouteName::Home => view! {
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content text-center">
                    <div class="max-w-md space-y-4">
                        <h1 class="text-5xl font-bold">"图床管理系统"</h1>
                        <p>"上传、管理和标注你的图片。"</p>
                        <div class="flex gap-2 justify-center">
                            <Link to=DASHBOARD_PATH>"进入控制台"</Link>
                            <Link to=LOGIN_PATH>"登录"</Link>
                        </div>
                    </div>
                </div>
            </div>
        }
        .into_any(),
        RouteName::Login => view! { <LoginPage /> }.into_any(),
        RouteName::Register => view! { <RegisterPage /> }.into_any(),
        RouteName::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
        _ => {
            let page = dashboard_page(route.clone());
            view! { <DashboardLayout route=route>{page}</DashboardLayout> }.into_any()
        }
    }
}

/// 选择会话存储：LocalStorage 不可用时退回内存
fn session_store() -> Session {
    if LocalStorage::is_available() {
        Session::new(LocalStorage)
    } else {
        log_warn!("[Session] LocalStorage 不可用，会话仅保存在内存中");
        Session::new(MemoryStore::new())
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 会话与提示
    let session = session_store();
    let toast = ToastContext::new();
    provide_context(session.clone());
    provide_context(toast);

    // 2. 路由服务只拿到只读会话，首次加载即执行守卫
    let router = provide_router(session.reader());

    // 3. 请求管线
    let client = ApiClient::builder(ClientConfig::from_build_env(), FetchTransport)
        .request_stage(BearerAuth::new(session.reader()))
        .failure_stage(NotifyFailure::new(toast))
        .failure_stage(ExpireSession::new(session, router))
        .build();
    log_info!("[App] Request pipeline: {:?}", client.stage_names());
    provide_context(client);

    view! {
        <ToastHost />
        <RouterOutlet matcher=route_matcher />
    }
}

/// 挂载到 `#app`，不存在时挂载到 body
pub fn mount() {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"))
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());

    match root {
        Some(el) => leptos::mount::mount_to(el, App).forget(),
        None => leptos::mount::mount_to_body(App),
    }
}
