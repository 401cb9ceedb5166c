//! # Vulcanize Library
//!
//! 将通过 HTML Import 相互引用的一组文档展开为单一的 HTML 文件。
//!
//! ## 模块组织
//!
//! - `dom` - arena 文档树、片段拼接原语、谓词查询
//! - `parsers` - HTML 解析与序列化、CSS `url()` 重写
//! - `utils` - 路径与引用处理、排除规则
//! - `inliner` - 样式表与脚本内联
//! - `importer` - 递归导入解析
//! - `passes` - 展开后的清理步骤
//! - `core` - 选项与完整处理流程
//! - `error` - 错误类型

pub mod core;
pub mod dom;
pub mod error;
pub mod importer;
pub mod inliner;
pub mod parsers;
pub mod passes;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::{
    print_error_message, vulcanize, write_output, Excludes, VulcanizeOptions, Vulcanizer,
};
pub use dom::{Fragment, NodeId, Tree};
pub use error::{VulcanizeError, VulcanizeResult};
pub use importer::Importer;
pub use parsers::{serialize_document, serialize_fragment, HtmlLoader, Loader};
pub use utils::{Exclusions, PathRewriter, RelativePaths};
