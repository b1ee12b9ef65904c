use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;

/// Network location of one service instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceAddress {
    pub host: String,
    pub port: u16,
}

impl ServiceAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Root HTTP URL of the instance, e.g. `http://127.0.0.1:3030/`.
    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parses `host:port`, tolerating an `http://` or `https://` prefix and a
/// trailing slash.
impl FromStr for ServiceAddress {
    type Err = DirectoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let without_scheme = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .unwrap_or(trimmed)
            .trim_end_matches('/');

        let (host, port) = without_scheme
            .rsplit_once(':')
            .ok_or_else(|| DirectoryError::InvalidAddress(raw.to_string()))?;

        if host.is_empty() {
            return Err(DirectoryError::InvalidAddress(raw.to_string()));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| DirectoryError::InvalidAddress(raw.to_string()))?;

        Ok(Self::new(host, port))
    }
}

/// A registration entry: which service, which instance, where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub service_name: String,
    pub instance_name: String,
    pub address: ServiceAddress,
}

impl ServiceInstance {
    pub fn new(
        service_name: impl Into<String>,
        instance_name: impl Into<String>,
        address: ServiceAddress,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            instance_name: instance_name.into(),
            address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_port() {
        let address: ServiceAddress = "127.0.0.1:3030".parse().unwrap();
        assert_eq!(address, ServiceAddress::new("127.0.0.1", 3030));
        assert_eq!(address.url(), "http://127.0.0.1:3030/");
        assert_eq!(address.to_string(), "127.0.0.1:3030");
    }

    #[test]
    fn test_parse_with_scheme() {
        let address: ServiceAddress = "http://mail.internal:5050/".parse().unwrap();
        assert_eq!(address, ServiceAddress::new("mail.internal", 5050));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("127.0.0.1".parse::<ServiceAddress>().is_err());
        assert!(":5050".parse::<ServiceAddress>().is_err());
        assert!("host:port".parse::<ServiceAddress>().is_err());
    }
}
