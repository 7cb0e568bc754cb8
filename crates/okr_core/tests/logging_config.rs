use okr_core::{
    default_log_level, init_logging_from_config, logging_status, CoreConfig, LoggingConfig,
};

#[test]
fn config_with_directory_and_no_level_uses_default_level() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().to_str().unwrap().to_string();
    let raw = format!("[logging]\nlog_dir = {log_dir:?}\n");
    let config = CoreConfig::from_toml_str(&raw).unwrap();
    assert_eq!(
        config.logging,
        LoggingConfig {
            level: None,
            log_dir: Some(log_dir.clone()),
        }
    );

    let started = init_logging_from_config(&config.logging).unwrap();
    assert!(started);

    let (level, active_dir) = logging_status().unwrap();
    assert_eq!(level, default_log_level());
    assert_eq!(active_dir, dir.path());

    // Same settings again are accepted.
    assert!(init_logging_from_config(&config.logging).unwrap());
}
