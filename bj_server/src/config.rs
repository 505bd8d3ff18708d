//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use blackjack::{
    DealerConfig, ProtocolConfig,
    messages::NAME_LEN,
    server::DEFAULT_SERVER_NAME,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4},
    str::FromStr,
    time::Duration,
};

/// Complete dealer configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Name advertised in offers
    pub server_name: String,
    /// Interface the game port is bound on
    pub bind_ip: IpAddr,
    /// Where offers are broadcast
    pub broadcast_addr: Ipv4Addr,
    /// Further offer targets, e.g. subnet broadcast addresses
    pub extra_targets: Vec<SocketAddr>,
    /// Seed for reproducible shuffles
    pub seed: Option<u64>,
    /// Whether to broadcast offers at all
    pub broadcast: bool,
    /// Seconds to wait for a player's decision
    pub read_timeout_secs: u64,
    /// Seconds to wait for a player's request after connecting
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `name_override` - Optional dealer name (from CLI args)
    /// * `bind_override` - Optional bind IP (from CLI args)
    /// * `seed_override` - Optional shuffle seed (from CLI args)
    /// * `no_broadcast` - Disable offers regardless of `DEALER_BROADCAST`
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but can't be parsed
    pub fn from_env(
        name_override: Option<String>,
        bind_override: Option<IpAddr>,
        seed_override: Option<u64>,
        no_broadcast: bool,
    ) -> Result<Self, ConfigError> {
        let server_name = name_override
            .or_else(|| std::env::var("DEALER_NAME").ok())
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());

        let bind_ip = match bind_override {
            Some(ip) => ip,
            None => parse_env("DEALER_BIND_IP")?.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        };

        let broadcast_addr = parse_env("DEALER_BROADCAST_ADDR")?.unwrap_or(Ipv4Addr::BROADCAST);

        let defaults = ProtocolConfig::default();
        let extra_targets = match parse_env::<String>("DEALER_EXTRA_TARGETS")? {
            Some(list) => parse_targets("DEALER_EXTRA_TARGETS", &list, defaults.discovery_port)?,
            None => Vec::new(),
        };

        let seed = match seed_override {
            Some(seed) => Some(seed),
            None => parse_env("DEALER_SEED")?,
        };

        Ok(ServerConfig {
            server_name,
            bind_ip,
            broadcast_addr,
            extra_targets,
            seed,
            broadcast: !no_broadcast && parse_env_or("DEALER_BROADCAST", true),
            read_timeout_secs: parse_env_or(
                "DEALER_READ_TIMEOUT_SECS",
                defaults.read_timeout.as_secs(),
            ),
            request_timeout_secs: parse_env_or(
                "DEALER_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            ),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "DEALER_NAME".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.server_name.len() > NAME_LEN {
            return Err(ConfigError::Invalid {
                var: "DEALER_NAME".to_string(),
                reason: format!(
                    "Must be at most {NAME_LEN} bytes (got {})",
                    self.server_name.len()
                ),
            });
        }

        if self.read_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "DEALER_READ_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "DEALER_REQUEST_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Dealer settings for this configuration
    #[must_use]
    pub fn dealer_config(&self) -> DealerConfig {
        DealerConfig {
            server_name: self.server_name.clone(),
            bind_ip: self.bind_ip,
            broadcast_addr: self.broadcast_addr,
            extra_targets: self.extra_targets.clone(),
            seed: self.seed,
            broadcast: self.broadcast,
            protocol: ProtocolConfig {
                read_timeout: Duration::from_secs(self.read_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                ..ProtocolConfig::default()
            },
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Helper to parse an optional environment variable that must be valid when set
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|e| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("{e}"),
        }),
        Err(_) => Ok(None),
    }
}

/// Parse a comma-separated list of offer targets. Items are either
/// `IP:PORT` or a bare IPv4 address on the discovery port.
fn parse_targets(key: &str, list: &str, port: u16) -> Result<Vec<SocketAddr>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<SocketAddr>()
                .or_else(|_| {
                    item.parse::<Ipv4Addr>()
                        .map(|ip| SocketAddr::V4(SocketAddrV4::new(ip, port)))
                })
                .map_err(|_| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: format!("'{item}' is neither IP:PORT nor an IPv4 address"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            server_name: "Test Dealer".to_string(),
            bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            broadcast_addr: Ipv4Addr::BROADCAST,
            extra_targets: Vec::new(),
            seed: None,
            broadcast: true,
            read_timeout_secs: 30,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "DEALER_NAME".to_string(),
            reason: "Must not be empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DEALER_NAME"));
        assert!(msg.contains("Must not be empty"));
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_name() {
        let config = ServerConfig {
            server_name: "  ".to_string(), // Invalid
            ..config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "DEALER_NAME"));
    }

    #[test]
    fn test_config_validation_name_too_long() {
        let config = ServerConfig {
            server_name: "x".repeat(33), // Invalid: doesn't fit the offer
            ..config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = ServerConfig {
            read_timeout_secs: 0, // Invalid
            ..config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "DEALER_READ_TIMEOUT_SECS"));
    }

    #[test]
    fn test_parse_targets() {
        let targets = parse_targets("X", "192.168.1.255, 10.0.0.255:4000,", 13122).unwrap();
        assert_eq!(
            targets,
            vec![
                "192.168.1.255:13122".parse::<SocketAddr>().unwrap(),
                "10.0.0.255:4000".parse().unwrap(),
            ]
        );
        assert!(matches!(
            parse_targets("X", "192.168.1.255,nope", 13122),
            Err(ConfigError::Invalid { var, .. }) if var == "X"
        ));
    }

    #[test]
    fn test_dealer_config_timeouts() {
        let dealer = ServerConfig {
            read_timeout_secs: 7,
            seed: Some(3),
            ..config()
        }
        .dealer_config();
        assert_eq!(dealer.protocol.read_timeout, Duration::from_secs(7));
        assert_eq!(dealer.protocol.discovery_port, 13122);
        assert_eq!(dealer.seed, Some(3));
        assert_eq!(dealer.server_name, "Test Dealer");
    }
}
