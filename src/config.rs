use std::net::{IpAddr, Ipv4Addr};

use rocket::{data::ByteUnit, figment::Figment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewBotConfig {
    /// Address the HTTP server binds to
    pub address: IpAddr,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Maximum accepted size of a webhook body, e.g. `1 MiB` or `512 KiB`.
    pub payload_limit: ByteUnit,
}

impl Default for ReviewBotConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            payload_limit: ByteUnit::Mebibyte(1),
        }
    }
}

impl ReviewBotConfig {
    /// Layers this configuration on top of Rocket's own (`Rocket.toml`, `ROCKET_*` env vars).
    pub fn figment(&self) -> Figment {
        rocket::Config::figment()
            .merge(("address", self.address))
            .merge(("port", self.port))
            .merge(("limits.json", self.payload_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ReviewBotConfig = serde_yaml::from_str("port: 9000\n").unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.address, ReviewBotConfig::default().address);
        assert_eq!(config.payload_limit, ByteUnit::Mebibyte(1));
    }

    #[test]
    fn test_full_config() {
        let config: ReviewBotConfig = serde_yaml::from_str(
            "address: 0.0.0.0\nport: 8080\npayload_limit: 512 KiB\n",
        )
        .unwrap();

        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8080);
        assert_eq!(config.payload_limit, ByteUnit::Kibibyte(512));
    }

    #[test]
    fn test_figment_carries_settings() {
        let config = ReviewBotConfig {
            port: 9123,
            ..Default::default()
        };
        let rocket_config: rocket::Config = config.figment().extract().unwrap();

        assert_eq!(rocket_config.port, 9123);
        assert_eq!(rocket_config.limits.get("json"), Some(ByteUnit::Mebibyte(1)));
    }
}
