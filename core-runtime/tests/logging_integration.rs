//! Integration tests for the logging helpers

use bridge_traits::time::LogLevel;
use core_runtime::logging::{redact_if_sensitive, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_pii);
    assert!(config.enable_spans);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());
}

#[test]
fn test_logging_config_json() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
}

#[test]
fn test_credentials_are_redacted() {
    assert_eq!(redact_if_sensitive("api_token", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("bearer", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("client_secret", "abc"), "[REDACTED]");
}

#[test]
fn test_user_text_is_redacted() {
    assert_eq!(
        redact_if_sensitive("cv_content", "Senior engineer at ..."),
        "[REDACTED]"
    );
    assert_eq!(
        redact_if_sensitive("answer_text", "I would use a queue"),
        "[REDACTED]"
    );
}

#[test]
fn test_emails_keep_only_first_char() {
    let redacted = redact_if_sensitive("author", "ana@study.example.com");
    assert!(redacted.starts_with('a'));
    assert!(!redacted.contains("study.example.com"));
}

#[test]
fn test_ordinary_values_pass_through() {
    assert_eq!(redact_if_sensitive("kind", "interview"), "interview");
    assert_eq!(
        redact_if_sensitive("label", "Interview: Data Analyst"),
        "Interview: Data Analyst"
    );
    assert_eq!(redact_if_sensitive("attempt", "2"), "2");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/ana/.local/share/studysync/history.json"), "history.json");
    assert_eq!(strip_path("D:\\sync\\history.json"), "history.json");
    assert_eq!(strip_path("history.json"), "history.json");
}
