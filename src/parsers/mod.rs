//! # 解析器模块
//!
//! - `html` - HTML 解析、arena 导入、序列化
//! - `css` - CSS 中 `url()` 引用的重写

pub mod css;
pub mod html;

pub use css::rewrite_css_urls;
pub use html::{serialize_document, serialize_fragment, HtmlLoader, Loader};
