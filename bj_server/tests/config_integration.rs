//! Integration tests for loading dealer configuration from the environment.
//!
//! These mutate process environment variables and are serialized.

use bj_server::config::{ConfigError, ServerConfig};
use serial_test::serial;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const VARS: [&str; 8] = [
    "DEALER_NAME",
    "DEALER_BIND_IP",
    "DEALER_BROADCAST_ADDR",
    "DEALER_SEED",
    "DEALER_READ_TIMEOUT_SECS",
    "DEALER_REQUEST_TIMEOUT_SECS",
    "DEALER_BROADCAST",
    "DEALER_EXTRA_TARGETS",
];

fn set(key: &str, value: &str) {
    // SAFETY: tests touching the environment are #[serial].
    unsafe { std::env::set_var(key, value) };
}

fn clear_env() {
    for var in VARS {
        // SAFETY: tests touching the environment are #[serial].
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let config = ServerConfig::from_env(None, None, None, false).unwrap();
    assert_eq!(config.server_name, "Byte the Dealer");
    assert_eq!(config.bind_ip, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(config.broadcast_addr, Ipv4Addr::BROADCAST);
    assert_eq!(config.seed, None);
    assert!(config.broadcast);
    assert_eq!(config.read_timeout_secs, 30);
    assert!(config.extra_targets.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_env_values() {
    clear_env();
    set("DEALER_NAME", "Env Dealer");
    set("DEALER_BIND_IP", "127.0.0.1");
    set("DEALER_BROADCAST_ADDR", "192.168.1.255");
    set("DEALER_SEED", "1234");
    set("DEALER_READ_TIMEOUT_SECS", "5");
    set("DEALER_BROADCAST", "false");

    let config = ServerConfig::from_env(None, None, None, false).unwrap();
    assert_eq!(config.server_name, "Env Dealer");
    assert_eq!(config.bind_ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.broadcast_addr, Ipv4Addr::new(192, 168, 1, 255));
    assert_eq!(config.seed, Some(1234));
    assert_eq!(config.read_timeout_secs, 5);
    assert!(!config.broadcast);
    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    set("DEALER_NAME", "Env Dealer");
    set("DEALER_SEED", "1");

    let config = ServerConfig::from_env(
        Some("Cli Dealer".to_string()),
        Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        Some(2),
        true,
    )
    .unwrap();
    assert_eq!(config.server_name, "Cli Dealer");
    assert_eq!(config.bind_ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.seed, Some(2));
    assert!(!config.broadcast);
    clear_env();
}

#[test]
#[serial]
fn test_invalid_bind_ip() {
    clear_env();
    set("DEALER_BIND_IP", "not-an-ip");
    let err = ServerConfig::from_env(None, None, None, false).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "DEALER_BIND_IP"));
    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_fails_validation() {
    clear_env();
    set("DEALER_REQUEST_TIMEOUT_SECS", "0");
    let config = ServerConfig::from_env(None, None, None, false).unwrap();
    assert!(config.validate().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_extra_targets_reach_the_dealer() {
    clear_env();
    set("DEALER_EXTRA_TARGETS", "192.168.1.255,10.0.0.255:4000");
    let config = ServerConfig::from_env(None, None, None, false).unwrap();
    let subnet: SocketAddr = "192.168.1.255:13122".parse().unwrap();
    let custom: SocketAddr = "10.0.0.255:4000".parse().unwrap();
    assert_eq!(config.extra_targets, vec![subnet, custom]);

    let targets = config.dealer_config().offer_targets();
    assert_eq!(
        targets,
        vec!["255.255.255.255:13122".parse().unwrap(), subnet, custom]
    );
    clear_env();
}

#[test]
#[serial]
fn test_invalid_extra_target() {
    clear_env();
    set("DEALER_EXTRA_TARGETS", "192.168.1.255,not-an-address");
    let err = ServerConfig::from_env(None, None, None, false).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "DEALER_EXTRA_TARGETS"));
    clear_env();
}
