//! 消息提示
//!
//! `Notifier` 是请求管线和剪贴板使用的通知接口，
//! 浏览器中由 `ToastContext` 实现并通过 `ToastHost` 渲染。

use std::time::Duration;

use leptos::prelude::*;

const SUCCESS_DURATION: Duration = Duration::from_secs(3);
const ERROR_DURATION: Duration = Duration::from_secs(5);

/// 短暂的用户提示
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// 提示上下文
#[derive(Clone, Copy)]
pub struct ToastContext {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl ToastContext {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    fn push(&self, kind: ToastKind, message: &str, duration: Duration) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.toasts.update(|list| {
            list.push(Toast {
                id,
                kind,
                message: message.to_string(),
            })
        });

        let toasts = self.toasts;
        set_timeout(move || toasts.update(|list| list.retain(|t| t.id != id)), duration);
    }
}

impl Default for ToastContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ToastContext {
    fn success(&self, message: &str) {
        self.push(ToastKind::Success, message, SUCCESS_DURATION);
    }

    fn error(&self, message: &str) {
        self.push(ToastKind::Error, message, ERROR_DURATION);
    }
}

/// 从 Context 获取提示上下文
pub fn use_toast() -> ToastContext {
    use_context::<ToastContext>().expect("ToastContext should be provided")
}

/// 提示框容器
#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = use_toast().toasts;

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || toasts.get()
                key=|t| t.id
                children=move |toast| {
                    let class = match toast.kind {
                        ToastKind::Success => "alert alert-success shadow-lg",
                        ToastKind::Error => "alert alert-error shadow-lg",
                    };
                    view! {
                        <div class=class>
                            <span>{toast.message}</span>
                        </div>
                    }
                }
            />
        </div>
    }
}
