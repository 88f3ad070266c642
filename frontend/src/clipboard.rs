//! 通用剪贴板工具
//!
//! 优先使用异步 Clipboard API（需要安全上下文），失败时回退到
//! `document.execCommand("copy")`。每次调用只产生一条提示。

use leptos::task::spawn_local;

use crate::toast::{Notifier, use_toast};
use crate::web::WebClipboard;

pub const COPY_SUCCESS_MESSAGE: &str = "复制成功";
pub const COPY_FAILURE_MESSAGE: &str = "复制失败，请手动复制";

/// 剪贴板错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// 环境不支持
    Unsupported,
    /// 异步写入被拒绝（权限等）
    Rejected(String),
    /// DOM 操作失败
    Dom(String),
}

impl core::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClipboardError::Unsupported => write!(f, "当前环境不支持剪贴板"),
            ClipboardError::Rejected(msg) => write!(f, "剪贴板写入被拒绝: {}", msg),
            ClipboardError::Dom(msg) => write!(f, "DOM 操作失败: {}", msg),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// 剪贴板能力
#[async_trait::async_trait(?Send)]
pub trait ClipboardBackend {
    /// 异步 Clipboard API 可用且处于安全上下文
    fn async_api_available(&self) -> bool;
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
    /// 传统复制，返回浏览器报告的结果
    fn legacy_copy(&self, text: &str) -> Result<bool, ClipboardError>;
}

/// 复制结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    CopiedByFallback,
    Failed,
}

/// 复制文本并提示结果
pub async fn copy_with<B, N>(backend: &B, notifier: &N, text: &str) -> CopyOutcome
where
    B: ClipboardBackend + ?Sized,
    N: Notifier + ?Sized,
{
    if backend.async_api_available() {
        match backend.write_text(text).await {
            Ok(()) => {
                notifier.success(COPY_SUCCESS_MESSAGE);
                return CopyOutcome::Copied;
            }
            Err(e) => log_warn!("[Clipboard] {}，回退到传统方法", e),
        }
    }

    match backend.legacy_copy(text) {
        Ok(true) => {
            notifier.success(COPY_SUCCESS_MESSAGE);
            CopyOutcome::CopiedByFallback
        }
        Ok(false) => {
            notifier.error(COPY_FAILURE_MESSAGE);
            CopyOutcome::Failed
        }
        Err(e) => {
            log_error!("[Clipboard] 复制失败: {}", e);
            notifier.error(COPY_FAILURE_MESSAGE);
            CopyOutcome::Failed
        }
    }
}

/// 复制函数（返回一个可调用的闭包，触发即忘）
///
/// 需要在组件初始化时调用，事件处理器里直接使用返回的闭包。
pub fn use_clipboard() -> impl Fn(String) + Clone {
    let toast = use_toast();
    move |text: String| {
        spawn_local(async move {
            copy_with(&WebClipboard, &toast, &text).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MockClipboard {
        api_available: bool,
        api_result: Option<ClipboardError>,
        legacy_result: Option<Result<bool, ClipboardError>>,
        log: RefCell<Vec<String>>,
    }

    #[async_trait::async_trait(?Send)]
    impl ClipboardBackend for MockClipboard {
        fn async_api_available(&self) -> bool {
            self.api_available
        }

        async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.log.borrow_mut().push(format!("api:{}", text));
            match &self.api_result {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        fn legacy_copy(&self, text: &str) -> Result<bool, ClipboardError> {
            self.log.borrow_mut().push(format!("legacy:{}", text));
            self.legacy_result.clone().unwrap_or(Ok(true))
        }
    }

    #[derive(Default)]
    struct Notes(RefCell<Vec<(bool, String)>>);

    impl Notifier for Notes {
        fn success(&self, message: &str) {
            self.0.borrow_mut().push((true, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.0.borrow_mut().push((false, message.to_string()));
        }
    }

    #[tokio::test]
    async fn secure_context_uses_async_api() {
        let backend = MockClipboard {
            api_available: true,
            ..Default::default()
        };
        let notes = Notes::default();

        let outcome = copy_with(&backend, &notes, "https://img.example.com/a.png").await;

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(*backend.log.borrow(), vec!["api:https://img.example.com/a.png"]);
        assert_eq!(*notes.0.borrow(), vec![(true, COPY_SUCCESS_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn rejected_api_falls_back_to_legacy() {
        let backend = MockClipboard {
            api_available: true,
            api_result: Some(ClipboardError::Rejected("NotAllowedError".to_string())),
            ..Default::default()
        };
        let notes = Notes::default();

        let outcome = copy_with(&backend, &notes, "abc").await;

        assert_eq!(outcome, CopyOutcome::CopiedByFallback);
        assert_eq!(*backend.log.borrow(), vec!["api:abc", "legacy:abc"]);
        assert_eq!(notes.0.borrow().len(), 1);
    }

    #[tokio::test]
    async fn rejected_api_and_failing_legacy_reports_one_failure() {
        let backend = MockClipboard {
            api_available: true,
            api_result: Some(ClipboardError::Rejected("denied".to_string())),
            legacy_result: Some(Ok(false)),
            ..Default::default()
        };
        let notes = Notes::default();

        assert_eq!(copy_with(&backend, &notes, "abc").await, CopyOutcome::Failed);
        assert_eq!(*notes.0.borrow(), vec![(false, COPY_FAILURE_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn no_async_api_goes_straight_to_legacy() {
        let backend = MockClipboard {
            legacy_result: Some(Err(ClipboardError::Dom("append failed".to_string()))),
            ..Default::default()
        };
        let notes = Notes::default();

        assert_eq!(copy_with(&backend, &notes, "abc").await, CopyOutcome::Failed);
        assert_eq!(*backend.log.borrow(), vec!["legacy:abc"]);
        assert_eq!(*notes.0.borrow(), vec![(false, COPY_FAILURE_MESSAGE.to_string())]);
    }
}
