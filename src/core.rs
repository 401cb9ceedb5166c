use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::dom::Tree;
use crate::error::{VulcanizeError, VulcanizeResult};
use crate::importer::Importer;
use crate::inliner::inline_scripts;
use crate::parsers::html::serialize_document;
use crate::passes::{
    deduplicate_imports, remove_noscript, separate_scripts, strip_comments_and_whitespace,
    use_named_polymer_invocations,
};
use crate::utils::path::Exclusions;

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Exclusion patterns, one set per kind of reference.
#[derive(Clone, Debug, Default)]
pub struct Excludes {
    /// Imports left as `<link rel="import">`
    pub imports: Exclusions,
    /// Stylesheets left as `<link rel="stylesheet">`
    pub styles: Exclusions,
    /// Scripts kept external when inlining scripts
    pub scripts: Exclusions,
}

/// Configuration options for a vulcanize run
///
/// `output_dir` and `csp_file` are derived from `output` unless set.
#[derive(Clone, Debug, Default)]
pub struct VulcanizeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub excludes: Excludes,
    pub inline: bool,
    pub csp: bool,
    pub csp_file: Option<PathBuf>,
    pub strip: bool,
    pub verbose: bool,
}

impl VulcanizeOptions {
    /// Directory every rewritten reference is relative to.
    pub fn output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Sidecar file receiving separated scripts.
    pub fn csp_file(&self) -> PathBuf {
        self.csp_file
            .clone()
            .unwrap_or_else(|| self.output.with_extension("js"))
    }
}

/// 文档处理器，按顺序执行导入展开和各清理步骤
pub struct Vulcanizer<'a> {
    options: &'a VulcanizeOptions,
}

impl<'a> Vulcanizer<'a> {
    pub fn new(options: &'a VulcanizeOptions) -> Self {
        Vulcanizer { options }
    }

    /// 处理输入文件并返回最终 HTML
    pub fn process(&self) -> VulcanizeResult<String> {
        let options = self.options;
        let output_dir = resolve_dir(&options.output_dir())?;

        // 1. 展开所有导入
        info!("flattening {}", options.input.display());
        let mut tree = Tree::new();
        let mut importer = Importer::new(&output_dir)
            .with_excluded_imports(options.excludes.imports.clone())
            .with_excluded_styles(options.excludes.styles.clone());
        let mut document = importer.flatten(&mut tree, &options.input, None)?;
        info!("flattened {} files", importer.read().len());

        // 2. 内联脚本
        if options.inline {
            info!("inlining scripts");
            inline_scripts(&mut tree, &mut document, &output_dir, &options.excludes.scripts)?;
        }

        // 3. Polymer 相关处理
        use_named_polymer_invocations(&mut tree, &document);
        remove_noscript(&mut tree, &document);

        // 4. CSP：脚本分离到单独文件
        if options.csp {
            separate_scripts(&mut tree, &mut document, &options.csp_file())?;
        }

        // 5. 清理
        deduplicate_imports(&mut tree, &mut document);
        if options.strip {
            info!("stripping comments and whitespace");
            strip_comments_and_whitespace(&mut tree, &mut document);
        }

        Ok(serialize_document(&tree, document))
    }
}

/// Flatten `options.input` and return the resulting document.
pub fn vulcanize(options: &VulcanizeOptions) -> VulcanizeResult<String> {
    Vulcanizer::new(options).process()
}

/// Write the vulcanized document to `path`.
pub fn write_output(path: &Path, content: &str) -> VulcanizeResult<()> {
    fs::write(path, content).map_err(|e| VulcanizeError::write(path, e))?;
    info!("wrote {}", path.display());
    Ok(())
}

fn resolve_dir(dir: &Path) -> VulcanizeResult<PathBuf> {
    fs::canonicalize(dir)
        .or_else(|_| std::path::absolute(dir))
        .map_err(|e| VulcanizeError::io(dir, e))
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}
