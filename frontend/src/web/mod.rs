//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装（fetch、LocalStorage、剪贴板、History），
//! 纯逻辑部分（路由表、守卫）不依赖浏览器，可在原生环境下测试。

mod clipboard;
pub mod guard;
mod http;
pub mod route;
pub mod router;
mod storage;

pub use clipboard::WebClipboard;
pub use http::FetchTransport;
pub use storage::LocalStorage;
