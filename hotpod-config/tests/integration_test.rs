//! Integration tests for hotpod-config

use std::time::Duration;

use hotpod_config::*;
use temp_env::with_vars;

#[test]
fn test_default_config_validation() {
    let config = HotpodConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("HOTPOD_PORT", Some("9090")),
        ("HOTPOD_LOG_LEVEL", Some("debug")),
        ("HOTPOD_MODE", Some("sidecar")),
        ("HOTPOD_STARTUP_DELAY", Some("2s")),
        ("HOTPOD_SHUTDOWN_TIMEOUT", Some("45s")),
        ("HOTPOD_DRAIN_IMMEDIATELY", Some("true")),
        ("HOTPOD_MAX_MEMORY_SIZE", Some("256MB")),
        ("HOTPOD_MAX_IO_SIZE", Some("512Mi")),
        ("HOTPOD_QUEUE_MAX_DEPTH", Some("50")),
        ("HOTPOD_SIDECAR_CPU_BASELINE", Some("250m")),
    ];

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.log_level, LogLevel::Debug);
        assert_eq!(config.server.mode, Mode::Sidecar);
        assert_eq!(config.lifecycle.startup_delay, Duration::from_secs(2));
        assert_eq!(config.lifecycle.shutdown_timeout, Duration::from_secs(45));
        assert!(config.lifecycle.drain_immediately);
        assert_eq!(config.limits.max_memory_size, 256 << 20);
        assert_eq!(config.limits.max_io_size, 512 << 20);
        assert_eq!(config.queue.max_depth, 50);
        assert_eq!(config.sidecar.cpu_baseline, Duration::from_millis(250));
    });
}

#[test]
fn test_unset_vars_keep_defaults() {
    let vars: Vec<(&str, Option<&str>)> = vec![
        ("HOTPOD_PORT", None),
        ("HOTPOD_LOG_LEVEL", None),
        ("HOTPOD_MAX_CONCURRENT_OPS", None),
    ];

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_level, LogLevel::Info);
        assert_eq!(config.limits.max_concurrent_ops, 100);
        assert_eq!(config.sidecar.memory_baseline, 50 << 20);
    });
}

#[test]
fn test_invalid_values_are_rejected() {
    with_vars(vec![("HOTPOD_PORT", Some("not-a-port"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });

    with_vars(vec![("HOTPOD_STARTUP_DELAY", Some("eleventy"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });

    with_vars(vec![("HOTPOD_LOG_LEVEL", Some("loud"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });

    with_vars(vec![("HOTPOD_IO_DIR_NAME", Some("../escape"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });

    with_vars(vec![("HOTPOD_DRAIN_IMMEDIATELY", Some("maybe"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });
}

#[test]
fn test_bool_vars_accept_short_and_cased_forms() {
    for (value, expected) in [
        ("t", true),
        ("T", true),
        ("1", true),
        ("True", true),
        ("f", false),
        ("F", false),
        ("0", false),
        ("FALSE", false),
    ] {
        with_vars(vec![("HOTPOD_DRAIN_IMMEDIATELY", Some(value))], || {
            let config = ConfigLoader::new().from_env().unwrap();
            assert_eq!(
                config.lifecycle.drain_immediately, expected,
                "value {value:?}"
            );
        });
    }
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("LOADGEN_PORT", Some("1234"))], || {
        let config = ConfigLoader::with_prefix("LOADGEN").from_env().unwrap();
        assert_eq!(config.server.port, 1234);
    });
}
