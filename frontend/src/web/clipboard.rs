//! 浏览器剪贴板

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::clipboard::{ClipboardBackend, ClipboardError};

/// 浏览器剪贴板实现
pub struct WebClipboard;

impl WebClipboard {
    /// `navigator.clipboard` 对象（web-sys 未默认暴露，通过反射读取）
    fn clipboard() -> Option<JsValue> {
        let navigator = web_sys::window()?.navigator();
        js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
    }
}

fn dom_error(e: JsValue) -> ClipboardError {
    ClipboardError::Dom(format!("{:?}", e))
}

#[async_trait::async_trait(?Send)]
impl ClipboardBackend for WebClipboard {
    fn async_api_available(&self) -> bool {
        let secure = web_sys::window()
            .map(|w| w.is_secure_context())
            .unwrap_or(false);
        secure && Self::clipboard().is_some()
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = Self::clipboard().ok_or(ClipboardError::Unsupported)?;
        let write = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .ok_or(ClipboardError::Unsupported)?;

        let promise: js_sys::Promise = write
            .call1(&clipboard, &JsValue::from_str(text))
            .map_err(|e| ClipboardError::Rejected(format!("{:?}", e)))?
            .dyn_into()
            .map_err(|_| ClipboardError::Unsupported)?;

        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| ClipboardError::Rejected(format!("{:?}", e)))
    }

    fn legacy_copy(&self, text: &str) -> Result<bool, ClipboardError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(ClipboardError::Unsupported)?;
        let body = document.body().ok_or(ClipboardError::Unsupported)?;

        let textarea: web_sys::HtmlTextAreaElement = document
            .create_element("textarea")
            .map_err(dom_error)?
            .dyn_into()
            .map_err(|_| ClipboardError::Dom("textarea 类型转换失败".to_string()))?;
        textarea.set_value(text);
        let _ = textarea.set_attribute("readonly", "");

        // 移出视口，避免页面闪动
        let style = textarea.style();
        for (name, value) in [
            ("position", "fixed"),
            ("left", "-999999px"),
            ("top", "-999999px"),
            ("z-index", "-1000"),
            ("opacity", "0"),
        ] {
            style.set_property(name, value).map_err(dom_error)?;
        }

        body.append_child(&textarea).map_err(dom_error)?;
        let _ = textarea.focus();
        textarea.select();

        let result = document
            .dyn_into::<web_sys::HtmlDocument>()
            .map_err(|_| ClipboardError::Unsupported)
            .and_then(|doc| doc.exec_command("copy").map_err(dom_error));

        // 无论成功与否都移除临时元素
        textarea.remove();
        result
    }
}
