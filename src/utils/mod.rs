//! # 工具模块
//!
//! - `path` - 引用分类、路径规范化、相对路径重写、排除规则

pub mod path;

// Re-export commonly used items for convenience
pub use path::{
    is_relative_file, is_remote, rebase_reference, reference_to_path,
    relative_reference, split_reference, Exclusions, PathRewriter, RelativePaths,
};
