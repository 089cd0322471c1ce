use std::io::Write;
use sumi_quill::config::{load_config, load_config_with_hash, StrategyKind};
use sumi_quill::ConfigError;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_config(
        r#"
[server]
port = 8080

[fetch]
strategy = "direct"

[identity]
user-agents = ["QuillTest/1.0", "QuillTest/2.0"]
"#,
    );

    let (config, hash) = load_config_with_hash(file.path()).expect("Failed to load config");

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.fetch.strategy, StrategyKind::Direct);
    assert_eq!(config.pipeline.max_retries, 3);
    assert_eq!(config.identity.user_agents.len(), 2);
    assert_eq!(hash.len(), 64);
}

#[test]
fn test_use_proxy_requires_proxies() {
    let file = write_config(
        r#"
[identity]
user-agents = ["QuillTest/1.0"]
use-proxy = true
"#,
    );

    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_rejects_unsupported_proxy_scheme() {
    let file = write_config(
        r#"
[identity]
user-agents = ["QuillTest/1.0"]
use-proxy = true
proxies = ["ftp://10.0.0.1:21"]
"#,
    );

    assert!(load_config(file.path()).is_err());
}
