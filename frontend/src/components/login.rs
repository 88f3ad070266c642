use image_hosting_shared::{LoginRequest, RegisterRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::{self, use_session};
use crate::http::use_api;
use crate::toast::{Notifier, use_toast};
use crate::web::guard::post_login_target;
use crate::web::route::LOGIN_PATH;
use crate::web::router::{Link, use_router};

#[component]
pub fn LoginPage() -> impl IntoView {
    let router = use_router();
    let session = use_session();
    let client = use_api();
    let toast = use_toast();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (remember, set_remember) = signal(false);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if username.get().trim().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("请输入用户名和密码".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let request = LoginRequest {
            username: username.get().trim().to_string(),
            password: password.get(),
            remember: Some(remember.get()),
        };
        let session = session.clone();
        let client = client.clone();
        spawn_local(async move {
            match auth::login(&client, &session, request).await {
                Ok(_) => {
                    toast.success("登录成功");
                    let login = router.current_route().get_untracked().location;
                    router.navigate(&post_login_target(&login));
                }
                // 接口错误已由请求管线提示
                Err(e) => {
                    if let Some(notice) = e.local_notice() {
                        toast.error(notice);
                    }
                }
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"图床管理系统"</h1>
                    <p class="text-base-content/70">"登录以继续"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="username">
                                <span class="label-text">"用户名"</span>
                            </label>
                            <input
                                id="username"
                                type="text"
                                on:input=move |ev| set_username.set(event_target_value(&ev))
                                prop:value=username
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"密码"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <label class="label cursor-pointer justify-start gap-2">
                            <input
                                type="checkbox"
                                class="checkbox checkbox-sm"
                                on:change=move |ev| set_remember.set(event_target_checked(&ev))
                                prop:checked=remember
                            />
                            <span class="label-text">"记住我"</span>
                        </label>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "登录中..." }.into_any()
                                } else {
                                    "登录".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center">
                            "还没有帐号？" <Link to="/register">"立即注册"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let router = use_router();
    let client = use_api();
    let toast = use_toast();

    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if password.get() != confirm.get() {
            set_error_msg.set(Some("两次输入的密码不一致".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let email = email.get();
        let request = RegisterRequest {
            username: username.get().trim().to_string(),
            password: password.get(),
            email: (!email.trim().is_empty()).then(|| email.trim().to_string()),
        };
        let client = client.clone();
        spawn_local(async move {
            if api::call(&client, &request).await.is_ok() {
                toast.success("注册成功，请登录");
                router.navigate(LOGIN_PATH);
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold mb-4">"注册帐号"</h1>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>
                        <input
                            type="text"
                            placeholder="用户名"
                            on:input=move |ev| set_username.set(event_target_value(&ev))
                            prop:value=username
                            class="input input-bordered"
                            required
                        />
                        <input
                            type="email"
                            placeholder="邮箱（可选）"
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                            prop:value=email
                            class="input input-bordered"
                        />
                        <input
                            type="password"
                            placeholder="密码"
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                            prop:value=password
                            class="input input-bordered"
                            required
                        />
                        <input
                            type="password"
                            placeholder="确认密码"
                            on:input=move |ev| set_confirm.set(event_target_value(&ev))
                            prop:value=confirm
                            class="input input-bordered"
                            required
                        />
                        <button class="btn btn-primary mt-4" disabled=move || is_submitting.get()>
                            "注册"
                        </button>
                        <p class="text-sm text-center">
                            "已有帐号？" <Link to=LOGIN_PATH>"返回登录"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
