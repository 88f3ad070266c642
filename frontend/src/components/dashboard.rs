use image_hosting_shared::{UpdatePasswordRequest, UserInfo};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::{self, use_session};
use crate::clipboard::use_clipboard;
use crate::http::use_api;
use crate::toast::{Notifier, use_toast};
use crate::web::route::{LOGIN_PATH, RouteMatch, RouteName};
use crate::web::router::{Link, use_router};

/// 侧边导航项：(路径, 名称, 仅管理员)
const NAV_ITEMS: &[(&str, &str, bool)] = &[
    ("/dashboard", "控制台", false),
    ("/dashboard/upload", "上传图片", false),
    ("/dashboard/images", "我的图片", false),
    ("/dashboard/annotation", "标注项目", false),
    ("/dashboard/profile", "个人中心", false),
    ("/dashboard/test-headers", "请求头测试", false),
    ("/dashboard/test-token", "Token测试", false),
    ("/dashboard/admin/users", "用户管理", true),
    ("/dashboard/admin/all-images", "所有图片", true),
    ("/dashboard/admin/stats", "系统统计", true),
    ("/dashboard/admin/projects", "项目管理", true),
    ("/dashboard/admin/create-project", "创建标注项目", true),
];

/// 控制台外壳：导航栏 + 侧边栏 + 子页面
#[component]
pub fn DashboardLayout(route: RouteMatch, children: Children) -> impl IntoView {
    let router = use_router();
    let session = use_session();
    let snapshot = session.snapshot();
    let is_admin = snapshot.is_admin();
    let name = snapshot
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();
    let title = route.title();

    let on_logout = move |_| {
        auth::logout(&session);
        router.navigate(LOGIN_PATH);
    };

    let nav = NAV_ITEMS
        .iter()
        .filter(|(_, _, admin_only)| is_admin || !admin_only)
        .map(|(path, label, _)| {
            let class = if route.location.path == *path { "active" } else { "" };
            view! {
                <li class=class>
                    <Link to=*path>{*label}</Link>
                </li>
            }
        })
        .collect_view();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <span class="btn btn-ghost text-xl">"图床管理系统"</span>
                        <span class="badge badge-neutral hidden md:inline-flex">{title}</span>
                    </div>
                    <div class="flex-none gap-2">
                        <span class="text-sm opacity-70">{name}</span>
                        <button on:click=on_logout class="btn btn-outline btn-error gap-2">
                            "退出登录"
                        </button>
                    </div>
                </div>

                <div class="flex flex-col md:flex-row gap-8">
                    <ul class="menu bg-base-100 rounded-box shadow-xl w-full md:w-56">{nav}</ul>
                    <div class="card bg-base-100 shadow-xl flex-1">
                        <div class="card-body">{children()}</div>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn DashboardHome() -> impl IntoView {
    let user = use_session().snapshot().user.unwrap_or_default();

    view! {
        <h3 class="card-title">"欢迎回来，" {user.display_name().to_string()}</h3>
        <p class="text-base-content/70 text-sm">"从左侧菜单选择要进行的操作。"</p>
    }
}

/// 尚未接入后端接口的页面
#[component]
pub fn PlaceholderPage(route: RouteMatch) -> impl IntoView {
    let detail = route
        .params
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ");

    view! {
        <h3 class="card-title">{route.title()}</h3>
        <p class="text-base-content/50">{detail}</p>
        <p class="text-base-content/50">"功能建设中"</p>
    }
}

fn user_rows(user: &UserInfo) -> Vec<(&'static str, String)> {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    vec![
        ("用户名", text(&user.username)),
        ("昵称", text(&user.nickname)),
        ("邮箱", text(&user.email)),
        ("角色", if user.is_admin() { "管理员" } else { "普通用户" }.to_string()),
        ("注册时间", text(&user.create_time)),
    ]
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let router = use_router();
    let session = use_session();
    let client = use_api();
    let toast = use_toast();

    let user = session.snapshot().user.unwrap_or_default();
    let (old_password, set_old_password) = signal(String::new());
    let (new_password, set_new_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        let request = UpdatePasswordRequest {
            old_password: old_password.get(),
            new_password: new_password.get(),
        };
        let session = session.clone();
        let client = client.clone();
        spawn_local(async move {
            if api::call(&client, &request).await.is_ok() {
                toast.success("密码已修改，请重新登录");
                auth::logout(&session);
                router.navigate(LOGIN_PATH);
            }
            set_is_submitting.set(false);
        });
    };

    let rows = user_rows(&user)
        .into_iter()
        .map(|(label, value)| view! { <tr><th>{label}</th><td>{value}</td></tr> })
        .collect_view();

    view! {
        <h3 class="card-title">"个人中心"</h3>
        <table class="table w-full"><tbody>{rows}</tbody></table>

        <form class="space-y-2 max-w-sm" on:submit=on_submit>
            <h4 class="font-bold">"修改密码"</h4>
            <input
                type="password"
                placeholder="原密码"
                on:input=move |ev| set_old_password.set(event_target_value(&ev))
                prop:value=old_password
                class="input input-bordered w-full"
                required
            />
            <input
                type="password"
                placeholder="新密码"
                on:input=move |ev| set_new_password.set(event_target_value(&ev))
                prop:value=new_password
                class="input input-bordered w-full"
                required
            />
            <button class="btn btn-primary" disabled=move || is_submitting.get()>"保存"</button>
        </form>
    }
}

/// 调试页：查看并复制当前 token
#[component]
pub fn TokenPage() -> impl IntoView {
    let token = use_session().snapshot().token.unwrap_or_default();
    let copy_value = token.clone();
    let copy = use_clipboard();

    view! {
        <h3 class="card-title">"Token 测试"</h3>
        <pre class="bg-base-200 p-4 rounded-box break-all whitespace-pre-wrap">{token}</pre>
        <button class="btn btn-outline" on:click=move |_| copy(copy_value.clone())>
            "复制 Token"
        </button>
    }
}

/// 调试页：用带鉴权头的请求拉取当前用户
#[component]
pub fn HeadersPage() -> impl IntoView {
    let session = use_session();
    let client = use_api();
    let toast = use_toast();
    let (result, set_result) = signal(Option::<String>::None);

    let on_fetch = move |_| {
        let session = session.clone();
        let client = client.clone();
        spawn_local(async move {
            let text = match auth::refresh_user(&client, &session).await {
                Ok(user) => serde_json::to_string_pretty(&user).unwrap_or_default(),
                Err(e) => {
                    if let Some(notice) = e.local_notice() {
                        toast.error(notice);
                    }
                    e.to_string()
                }
            };
            set_result.set(Some(text));
        });
    };

    view! {
        <h3 class="card-title">"请求头测试"</h3>
        <button class="btn btn-outline" on:click=on_fetch>"获取当前用户"</button>
        <Show when=move || result.get().is_some()>
            <pre class="bg-base-200 p-4 rounded-box">{move || result.get().unwrap_or_default()}</pre>
        </Show>
    }
}

/// 子页面分发
pub fn dashboard_page(route: RouteMatch) -> AnyView {
    match route.name {
        RouteName::Dashboard => view! { <DashboardHome /> }.into_any(),
        RouteName::Profile => view! { <ProfilePage /> }.into_any(),
        RouteName::TestToken => view! { <TokenPage /> }.into_any(),
        RouteName::TestHeaders => view! { <HeadersPage /> }.into_any(),
        _ => view! { <PlaceholderPage route=route /> }.into_any(),
    }
}
