//! HTML解析和处理模块
//!
//! - `dom`: html5ever 解析结果与 arena 之间的转换
//! - `parser`: `Loader` 接口与基于 html5ever 的实现
//! - `serializer`: 序列化功能

pub mod dom;
pub mod parser;
pub mod serializer;

pub use dom::{html_fragment_to_dom, html_to_dom, import_document, import_fragment};
pub use parser::{HtmlLoader, Loader};
pub use serializer::{serialize_document, serialize_fragment, SerializableFragment};
