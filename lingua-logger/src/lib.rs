use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "lingua.log";
const DEFAULT_LEVEL: &str = "info";

/// 日志初始化错误
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to create rolling file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("global subscriber already set: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// 日志配置
///
/// 既可以通过构建器方法设置，也可以作为配置文件中的 `log` 段反序列化，
/// 缺省字段使用默认值。支持控制台输出和按天滚动的文件输出。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// 日志文件前缀 (实际文件名会包含日期，如 lingua.log.2023-10-01)
    file_prefix: String,
    /// 日志存储目录
    log_dir: PathBuf,
    /// 时间格式字符串 (基于 Chrono 格式)
    time_format: String,
    /// 日志级别或过滤指令，如 `info` 或 `warn,lingua=debug`
    level: String,
    /// 是否启用控制台输出
    console: bool,
    /// 是否启用文件输出
    file: bool,
    /// 保留的最大日志文件数量，由滚动写入器自动清理
    max_files: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            console: true,
            file: true,
            max_files: None,
        }
    }
}

impl LoggerConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志文件前缀
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// 设置日志存储目录
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// 设置日志时间戳格式
    ///
    /// 格式参考 chrono::format::strftime
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// 设置日志级别或过滤指令
    ///
    /// 若环境变量 `RUST_LOG` 存在，则以环境变量为准。
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// 启用或禁用控制台日志输出
    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    /// 启用或禁用文件日志输出
    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    /// 设置保留的最大日志文件数量
    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = Some(count);
        self
    }

    pub fn is_file_enabled(&self) -> bool {
        self.file
    }

    /// 初始化日志系统
    ///
    /// 注册全局 tracing subscriber，同时桥接 `log` 门面的记录。
    /// 返回的 `WorkerGuard` 必须被持有，以确保异步日志在程序结束前被刷新。
    pub fn init(&self) -> Result<Option<WorkerGuard>, LoggerError> {
        let filter = self.build_filter();
        let console_layer = self.build_console_layer();
        let (file_layer, guard) = match self.build_file_layer()? {
            Some((layer, guard)) => (Some(layer), Some(guard)),
            None => (None, None),
        };

        Registry::default()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }

    /// 构建控制台输出层
    fn build_console_layer<S>(&self) -> Option<impl Layer<S> + use<S>>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        self.console.then(|| {
            fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_writer(std::io::stdout)
        })
    }

    /// 构建文件输出层
    fn build_file_layer<S>(&self) -> Result<Option<(impl Layer<S> + use<S>, WorkerGuard)>, LoggerError>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        if !self.file {
            return Ok(None);
        }

        let mut builder = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(&self.file_prefix);
        if let Some(max_files) = self.max_files {
            builder = builder.max_log_files(max_files.max(1));
        }
        let file_appender = builder.build(&self.log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_timer(ChronoLocal::new(self.time_format.clone()))
            .with_ansi(false)
            .with_writer(non_blocking);

        Ok(Some((layer, guard)))
    }
}
