//! YAML 配置加载器，支持环境变量替换
//!
//! 形如 `${NAME}` 或 `${NAME:default}` 的占位符在反序列化前被替换。
//! 首次加载时会尝试读取 `.env` 文件。

use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use thiserror::Error;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

fn var_regex() -> &'static Regex {
    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z0-9_]+)(?::([^\}]*))?\}").expect("Invalid regex pattern")
    })
}

fn load_dotenv() {
    static DOTENV: Once = Once::new();
    // 生产环境通常没有 .env 文件，忽略错误
    DOTENV.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// 使用给定的查找函数替换占位符
///
/// 查找失败时使用默认值，没有默认值则替换为空串。
pub fn replace_vars_with<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    var_regex()
        .replace_all(content, |caps: &Captures| {
            lookup(&caps[1])
                .or_else(|| caps.get(2).map(|m| m.as_str().to_string()))
                .unwrap_or_default()
        })
        .into_owned()
}

/// 使用进程环境变量替换占位符
pub fn replace_vars(content: &str) -> String {
    load_dotenv();
    replace_vars_with(content, |name| env::var(name).ok())
}

/// 从文件加载 YAML 配置
pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&content)
}

/// 从字符串加载 YAML 配置
pub fn load_from_str<T: DeserializeOwned>(yaml_content: &str) -> Result<T, ConfigError> {
    let replaced = replace_vars(yaml_content);
    Ok(serde_yaml::from_str(&replaced)?)
}

/// 编译时嵌入 YAML 文件
#[macro_export]
macro_rules! include_yaml {
    ($path:expr, $t:ty) => {
        $crate::yaml::load_from_str::<$t>(include_str!($path))
    };
}

pub use include_yaml;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "APP_LANG" => Some("English".to_string()),
            "lower_case" => Some("ok".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_replace_vars_basic() {
        assert_eq!(replace_vars_with("lang: ${APP_LANG}", lookup), "lang: English");
        assert_eq!(replace_vars_with("v: ${lower_case}", lookup), "v: ok");
    }

    #[test]
    fn test_replace_vars_default() {
        assert_eq!(replace_vars_with("lang: ${MISSING:Russian}", lookup), "lang: Russian");
        assert_eq!(replace_vars_with("lang: ${APP_LANG:Russian}", lookup), "lang: English");
    }

    #[test]
    fn test_replace_vars_no_default() {
        assert_eq!(replace_vars_with("lang: ${MISSING}", lookup), "lang: ");
        assert_eq!(replace_vars_with("lang: ${MISSING:}", lookup), "lang: ");
    }

    #[test]
    fn test_replace_vars_leaves_tags_alone() {
        // 标签占位符 #{tag} 不属于环境变量语法
        assert_eq!(replace_vars_with("title: '#{hello}'", lookup), "title: '#{hello}'");
    }

    #[test]
    fn test_load_from_str() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Config {
            root: String,
            passes: usize,
        }

        unsafe {
            env::set_var("LINGUA_TEST_ROOT", "./resources");
        }
        let yaml = r#"
        root: ${LINGUA_TEST_ROOT}
        passes: ${LINGUA_TEST_PASSES:16}
        "#;

        let config: Config = load_from_str(yaml).unwrap();
        assert_eq!(config.root, "./resources");
        assert_eq!(config.passes, 16);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = load_from_file::<serde_yaml::Value, _>("/this/path/should/not/exist.yaml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
