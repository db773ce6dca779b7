use crate::channel::SecurityMode;
use crate::config::ClientConfig;
use crate::error::config::ConfigError;

use std::path::PathBuf;

/// **VALUE**: Verifies a missing config file yields defaults instead of an
/// error.
///
/// **WHY THIS MATTERS**: First run on a fresh machine has no config file.
/// Treating that as an error would force every user through a manual setup
/// step before anything works.
///
/// **BUG THIS CATCHES**: Would catch the missing-file branch being folded
/// into the read-error path.
#[test]
fn given_no_config_file_when_loaded_then_defaults_returned() {
    let dir = tempfile::tempdir().unwrap();

    let config = ClientConfig::load(dir.path()).unwrap();

    assert_eq!(config.version, 1);
    assert_eq!(config.connection.host, "127.0.0.1");
    assert_eq!(config.connection.port, 50051);
    assert!(!config.connection.insecure);
    assert!(!config.launcher.auto_launch);
}

/// **VALUE**: Verifies save then load round-trips every stored field.
///
/// **WHY THIS MATTERS**: Users set a remote host or pinned certificate once
/// and expect it back on the next run. A lossy round trip silently reverts
/// their setup.
///
/// **BUG THIS CATCHES**: Would catch a field missing its serde attribute or
/// dropped during serialization.
#[test]
fn given_saved_config_when_loaded_then_values_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let mut config = ClientConfig::default();
    config.connection.host = "10.0.0.7".to_string();
    config.connection.port = 50052;
    config.connection.insecure = true;
    config.launcher.auto_launch = true;
    config.launcher.headless = true;
    config.launcher.app_path = Some(PathBuf::from("/opt/reader/absorbance96app"));

    config.save(dir.path()).unwrap();
    let loaded = ClientConfig::load(dir.path()).unwrap();

    assert_eq!(loaded.connection.host, "10.0.0.7");
    assert_eq!(loaded.connection.port, 50052);
    assert!(loaded.connection.insecure);
    assert!(loaded.launcher.auto_launch);
    assert!(loaded.launcher.headless);
    assert_eq!(
        loaded.launcher.app_path,
        Some(PathBuf::from("/opt/reader/absorbance96app"))
    );
}

/// **VALUE**: Verifies corrupted config files surface as parse errors.
///
/// **WHY THIS MATTERS**: Silently replacing a corrupted file with defaults
/// would discard user settings and hide the corruption; the user should see
/// the failure and decide.
///
/// **BUG THIS CATCHES**: Would catch the load path swallowing JSON errors
/// and falling back to defaults.
#[test]
fn given_corrupt_config_file_when_loaded_then_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{not valid json").unwrap();

    let result = ClientConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies unknown config versions are rejected by validation.
///
/// **WHY THIS MATTERS**: A config written by a newer client may carry
/// semantics this version cannot honor. Rejecting it is safer than a
/// best-effort read that misinterprets fields.
///
/// **BUG THIS CATCHES**: Would catch version checking being skipped on load.
#[test]
fn given_future_version_when_loaded_then_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), r#"{"version": 99}"#).unwrap();

    let result = ClientConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

/// **VALUE**: Verifies stored connection defaults map onto channel settings.
///
/// **WHY THIS MATTERS**: The config file is the only place the insecure flag
/// and pinned certificate live between runs; a wrong mapping downgrades TLS
/// or drops the pin without any visible sign.
///
/// **BUG THIS CATCHES**: Would catch the insecure flag and trusted_cert path
/// being crossed when building the security mode.
#[test]
fn given_connection_defaults_when_mapped_then_security_mode_follows_flags() {
    // GIVEN: A config with a pinned certificate
    let mut config = ClientConfig::default();
    config.connection.host = "10.0.0.7".to_string();
    config.connection.trusted_cert = Some(PathBuf::from("/tmp/reader.pem"));

    // WHEN: Channel settings are derived
    let connection = config.connection_config();

    // THEN: TLS with the pin
    assert_eq!(connection.host, "10.0.0.7");
    assert_eq!(
        connection.security,
        SecurityMode::SelfSigned {
            trusted_cert: Some(PathBuf::from("/tmp/reader.pem")),
        }
    );

    // WHEN: The insecure flag is set
    config.connection.insecure = true;

    // THEN: Plain HTTP wins over the pin
    assert_eq!(
        config.connection_config().security,
        SecurityMode::Insecure
    );
}
