// 集成测试公共模块
//
// 在临时目录中构建由多个文件组成的测试项目

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vulcanize::dom::predicate::Predicate;
use vulcanize::{Fragment, Tree};

/// 临时项目目录
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Project {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// 写入文件，必要时创建上级目录
    pub fn file(&self, name: &str, content: &str) -> &Self {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture directory");
        }
        fs::write(&path, content).expect("failed to write fixture");
        self
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("failed to read output")
    }
}

/// 统计片段中满足谓词的节点数
pub fn count(tree: &Tree, fragment: Fragment, predicate: &impl Predicate) -> usize {
    fragment.search(tree, predicate).len()
}
