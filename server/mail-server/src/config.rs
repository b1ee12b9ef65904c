use clap::Parser;
use events_bus::NatsConfig;
use mail_common::{DEFAULT_QUEUE_GROUP, MAIL_SERVICE_NAME, MAIL_TOPIC};
use secrecy::SecretString;
use service_directory::{ConsulConfig, ServiceAddress, ServiceInstance};

/// Mailgate mail dispatch server
#[derive(Parser, Debug, Clone)]
#[command(name = "mail-server", version)]
#[command(about = "Accepts mail over HTTP and NATS and dispatches it through one provider")]
pub struct ServerConfig {
    /// Server bind address
    #[arg(long, env = "MAILGATE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "MAILGATE_PORT", default_value_t = 5050)]
    pub port: u16,

    /// Instance name, used as the directory registration id
    #[arg(long, env = "MAILGATE_NAME", default_value = "mail1")]
    pub name: String,

    /// Host other services should use to reach this instance
    #[arg(long, env = "MAILGATE_ADVERTISE_HOST", default_value = "127.0.0.1")]
    pub advertise_host: String,

    /// NATS server URL
    #[arg(long, env = "NATS_URL", default_value = "nats://localhost:4222")]
    pub nats_url: String,

    /// Serve HTTP ingress only
    #[arg(long, env = "MAILGATE_DISABLE_NATS")]
    pub disable_nats: bool,

    /// NATS queue group shared by all dispatch instances
    #[arg(long, env = "MAILGATE_QUEUE_GROUP", default_value = DEFAULT_QUEUE_GROUP)]
    pub queue_group: String,

    /// NATS subject carrying mail envelopes
    #[arg(long, env = "MAILGATE_TOPIC", default_value = MAIL_TOPIC)]
    pub topic: String,

    /// Consul agent address; directory registration is skipped when unset
    #[arg(long, env = "CONSUL_HTTP_ADDR")]
    pub consul_addr: Option<String>,

    /// Consul ACL token
    #[arg(long, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    pub consul_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines
    #[arg(long, env = "MAILGATE_LOG_JSON")]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directory entry advertised for this instance.
    pub fn service_instance(&self) -> ServiceInstance {
        ServiceInstance::new(
            MAIL_SERVICE_NAME,
            self.name.as_str(),
            ServiceAddress::new(self.advertise_host.as_str(), self.port),
        )
    }

    pub fn nats_config(&self) -> Option<NatsConfig> {
        if self.disable_nats {
            return None;
        }

        Some(NatsConfig {
            server_url: self.nats_url.clone(),
            connection_name: Some(self.name.clone()),
        })
    }

    pub fn consul_config(&self) -> Option<ConsulConfig> {
        let base_url = self.consul_addr.as_ref()?;
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url.clone()
        } else {
            format!("http://{}", base_url)
        };

        Some(ConsulConfig {
            base_url,
            token: self.consul_token.clone().map(SecretString::new),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["mail-server"]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:5050");
        assert_eq!(config.name, "mail1");
        assert_eq!(config.queue_group, "mailgun");
        assert_eq!(config.topic, "mail");

        let instance = config.service_instance();
        assert_eq!(instance.service_name, "mail");
        assert_eq!(instance.instance_name, "mail1");
        assert_eq!(instance.address.to_string(), "127.0.0.1:5050");
    }

    #[test]
    fn test_consul_address_gets_scheme() {
        let config =
            ServerConfig::try_parse_from(["mail-server", "--consul-addr", "consul:8500"]).unwrap();

        let consul = config.consul_config().unwrap();
        assert_eq!(consul.base_url, "http://consul:8500");
        assert!(consul.token.is_none());
    }

    #[test]
    fn test_nats_can_be_disabled() {
        let config = ServerConfig::try_parse_from(["mail-server", "--disable-nats"]).unwrap();
        assert!(config.nats_config().is_none());
    }
}
