use lingua_logger::{LoggerConfig, LoggerError};
use std::path::Path;

#[test]
fn test_file_logging_and_single_init() {
    let dir = "./target/lingua_logger_tests";
    // Clean up before start
    if Path::new(dir).exists() {
        std::fs::remove_dir_all(dir).unwrap();
    }

    let file_name = "file_logging.log";
    let guard = LoggerConfig::new()
        .log_dir(dir)
        .file_prefix(file_name)
        .level("debug")
        .max_files(3)
        .enable_console(false)
        .init()
        .unwrap();
    assert!(guard.is_some(), "file output should hand back a worker guard");

    tracing::warn!(language = "English", "language changed");

    // A second global subscriber must be rejected rather than panic
    let second = LoggerConfig::new().enable_file(false).init();
    assert!(matches!(second, Err(LoggerError::Init(_))));

    // Dropping the guard flushes the non-blocking writer
    drop(guard);

    let files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(file_name))
        })
        .collect();
    assert_eq!(files.len(), 1, "expected exactly one rolling log file: {:?}", files);

    let content = std::fs::read_to_string(&files[0]).unwrap();
    assert!(content.contains("language changed"), "log content: {}", content);
    assert!(content.contains("English"));
}
