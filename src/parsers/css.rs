//! CSS 解析器模块
//!
//! Only `url(...)` references matter when a stylesheet moves between
//! directories, so this module rewrites those and leaves every other token of
//! the stylesheet byte-for-byte intact.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?P<quote>['"]?)(?P<url>[^'")]*?)['"]?\s*\)"#).unwrap()
});

/// Rewrite every `url(...)` in `css` through `rewrite`.
///
/// `rewrite` receives the bare reference (quotes and padding stripped) and
/// returns the replacement, or `None` to keep the original text. Quoting
/// style is preserved.
pub fn rewrite_css_urls<F>(css: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    CSS_URL
        .replace_all(css, |caps: &Captures| match rewrite(&caps["url"]) {
            Some(url) => format!("url({quote}{url}{quote})", quote = &caps["quote"]),
            None => caps[0].to_string(),
        })
        .into_owned()
}
