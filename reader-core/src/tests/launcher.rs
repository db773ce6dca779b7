use crate::channel::SecurityMode;
use crate::launcher::LaunchConfig;
use crate::launcher::spawn::connection_config_for;

use std::path::PathBuf;

/// **VALUE**: Verifies a default launch config emits only `--remote`.
///
/// **WHY THIS MATTERS**: Every extra flag is a chance to contradict the
/// application's own default. The command line stays minimal so the
/// application's behavior matches what its documentation promises for each
/// unset option.
///
/// **BUG THIS CATCHES**: Would catch default values being emitted
/// unconditionally.
#[test]
fn given_default_launch_config_when_rendered_then_only_remote_flag() {
    let args = LaunchConfig::default().to_cli_args();

    assert_eq!(args, vec!["--remote".to_string()]);
}

/// **VALUE**: Verifies every non-default option renders its flag with the
/// right value.
///
/// **WHY THIS MATTERS**: These flags are the only contract with the vendor
/// application; a misspelled flag or value in the wrong position is ignored
/// or rejected at launch, long after this code ran.
///
/// **BUG THIS CATCHES**: Would catch a flag constant typo or a value emitted
/// without its flag.
#[test]
fn given_full_launch_config_when_rendered_then_all_flags_present() {
    let config = LaunchConfig {
        port: 50052,
        ip: "0.0.0.0".to_string(),
        insecure: true,
        headless: true,
        uuid: Some("2b2f3bbc-09a7-4c64-b5e6-9c0c1f8d4f21".to_string()),
        ca_cert: Some(PathBuf::from("/certs/ca.pem")),
        cert: Some(PathBuf::from("/certs/server.pem")),
        key: Some(PathBuf::from("/certs/server.key")),
        out_cert: Some(PathBuf::from("/certs/generated.pem")),
    };

    let args = config.to_cli_args();

    assert_eq!(
        args,
        vec![
            "--remote",
            "--remote-port",
            "50052",
            "--remote-ip",
            "0.0.0.0",
            "--remote-insecure",
            "--headless",
            "--remote-uuid",
            "2b2f3bbc-09a7-4c64-b5e6-9c0c1f8d4f21",
            "--remote-ca-cert",
            "/certs/ca.pem",
            "--remote-cert",
            "/certs/server.pem",
            "--remote-key",
            "/certs/server.key",
            "--remote-out-cert",
            "/certs/generated.pem",
        ]
    );
}

/// **VALUE**: Verifies the client connection settings derived from a launch
/// config can actually reach the launched service.
///
/// **WHY THIS MATTERS**: The application binds where the launch config says;
/// the client must connect to the same port with a matching TLS policy, and
/// a wildcard bind address is not a dialable host.
///
/// **BUG THIS CATCHES**: Would catch 0.0.0.0 being dialed literally, or the
/// generated certificate not being pinned for the TLS case.
#[test]
fn given_launch_config_when_connection_derived_then_reachable_settings() {
    // GIVEN: An insecure launch bound to the wildcard address
    let mut config = LaunchConfig {
        port: 50052,
        ip: "0.0.0.0".to_string(),
        insecure: true,
        ..LaunchConfig::default()
    };

    // WHEN: Client settings are derived
    let connection = connection_config_for(&config);

    // THEN: Loopback host, same port, plain HTTP
    assert_eq!(connection.host, "127.0.0.1");
    assert_eq!(connection.port, 50052);
    assert_eq!(connection.security, SecurityMode::Insecure);

    // WHEN: TLS with a saved generated certificate
    config.insecure = false;
    config.ip = "192.168.1.50".to_string();
    config.out_cert = Some(PathBuf::from("/certs/generated.pem"));
    let connection = connection_config_for(&config);

    // THEN: The written certificate is pinned
    assert_eq!(connection.host, "192.168.1.50");
    assert_eq!(
        connection.security,
        SecurityMode::SelfSigned {
            trusted_cert: Some(PathBuf::from("/certs/generated.pem")),
        }
    );
}

/// **VALUE**: Verifies a detached child with piped output can keep writing
/// past the OS pipe buffer without blocking.
///
/// **WHY THIS MATTERS**: The launched application runs long after the
/// launcher detaches and logs continuously. If nothing reads its piped
/// streams, the application blocks on write once the pipe fills (~64KB) and
/// the instrument service wedges mid-session.
///
/// **BUG THIS CATCHES**: Would catch the output drain being dropped from the
/// launch path, leaving the piped streams without a reader.
#[cfg(unix)]
#[tokio::test]
async fn given_chatty_child_when_output_drained_then_child_can_exit() {
    use crate::launcher::spawn::drain_child_output;
    use std::process::Stdio;
    use std::time::Duration;
    use tokio::process::Command;

    // GIVEN: A child writing well past the pipe buffer on both streams
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg("head -c 200000 /dev/zero | tr '\\0' 'x'; head -c 200000 /dev/zero | tr '\\0' 'y' >&2");
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn().expect("Child should spawn");

    // WHEN: Its output is drained the way the launcher does before detach
    drain_child_output(&mut child);

    // THEN: The child finishes instead of blocking on a full pipe
    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("Child must not block on a full pipe buffer")
        .expect("Child status should be collectable");
    assert!(status.success());
}

/// **VALUE**: Verifies launching is refused on platforms without a vendor
/// build.
///
/// **WHY THIS MATTERS**: On Linux there is nothing to spawn; a clear
/// validation error beats an opaque "file not found" from the OS.
///
/// **BUG THIS CATCHES**: Would catch the platform dispatch falling through
/// to the Windows branch.
#[cfg(target_os = "linux")]
#[test]
fn given_unsupported_platform_when_command_built_then_validation_error() {
    use crate::error::launch::LaunchError;
    use crate::launcher::spawn::build_launch_command;
    use std::path::Path;

    let result = build_launch_command(Path::new("/opt/reader/app"), &LaunchConfig::default());

    assert!(matches!(result, Err(LaunchError::Validation { .. })));
}
