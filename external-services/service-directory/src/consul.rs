use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address::ServiceInstance;
use crate::directory::Directory;
use crate::error::{DirectoryError, DirectoryResult};

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Consul agent connection settings
#[derive(Debug)]
pub struct ConsulConfig {
    /// Agent HTTP API, e.g. `http://127.0.0.1:8500`
    pub base_url: String,
    /// ACL token sent with every request when set
    pub token: Option<SecretString>,
    pub timeout_secs: u64,
    /// Path on the registered instance the agent polls for liveness
    pub health_path: String,
    /// Poll interval, Consul duration syntax
    pub check_interval: String,
    /// An instance failing its check this long is removed by the agent
    pub deregister_after: String,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8500".to_string(),
            token: None,
            timeout_secs: 5,
            health_path: "/health".to_string(),
            check_interval: "10s".to_string(),
            deregister_after: "1m".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceRegistration<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    name: &'a str,
    address: &'a str,
    port: u16,
    check: AgentServiceCheck<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceCheck<'a> {
    #[serde(rename = "HTTP")]
    http: String,
    interval: &'a str,
    deregister_critical_service_after: &'a str,
}

/// One entry of `/v1/health/service/{name}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthEntry {
    node: HealthNode,
    service: HealthService,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthNode {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthService {
    #[serde(default)]
    address: String,
    port: u16,
}

impl HealthEntry {
    /// Service address falls back to the node address when unset.
    fn host_port(&self) -> String {
        let host = if self.service.address.is_empty() {
            &self.node.address
        } else {
            &self.service.address
        };
        format!("{}:{}", host, self.service.port)
    }
}

/// [`Directory`] backed by the Consul agent HTTP API.
pub struct ConsulDirectory {
    http: reqwest::Client,
    config: ConsulConfig,
}

impl ConsulDirectory {
    pub fn new(config: ConsulConfig) -> DirectoryResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let builder = self.http.request(method, url);

        match &self.config.token {
            Some(token) => builder.header(TOKEN_HEADER, token.expose_secret().as_str()),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> DirectoryResult<reqwest::Response> {
        builder
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl Directory for ConsulDirectory {
    async fn register(&self, instance: &ServiceInstance) -> DirectoryResult<()> {
        let address = &instance.address;
        let registration = AgentServiceRegistration {
            id: &instance.instance_name,
            name: &instance.service_name,
            address: &address.host,
            port: address.port,
            check: AgentServiceCheck {
                http: format!("http://{}:{}{}", address.host, address.port, self.config.health_path),
                interval: &self.config.check_interval,
                deregister_critical_service_after: &self.config.deregister_after,
            },
        };

        self.execute(
            self.request(Method::PUT, "/v1/agent/service/register")
                .json(&registration),
        )
        .await?;

        info!(
            service = %instance.service_name,
            instance = %instance.instance_name,
            address = %instance.address,
            "Registered with Consul"
        );
        Ok(())
    }

    /// Only instances whose health check is passing are returned.
    async fn services_by_name(&self, service_name: &str) -> DirectoryResult<Vec<String>> {
        let response = self
            .execute(
                self.request(Method::GET, &format!("/v1/health/service/{service_name}"))
                    .query(&[("passing", "true")]),
            )
            .await?;

        let entries: Vec<HealthEntry> = response
            .json()
            .await
            .map_err(|e| DirectoryError::Unavailable(format!("malformed health response: {e}")))?;

        debug!(service = service_name, passing = entries.len(), "Consul health lookup");
        Ok(entries.iter().map(HealthEntry::host_port).collect())
    }

    async fn unregister(&self, instance: &ServiceInstance) -> DirectoryResult<()> {
        self.execute(self.request(
            Method::PUT,
            &format!("/v1/agent/service/deregister/{}", instance.instance_name),
        ))
        .await?;

        info!(instance = %instance.instance_name, "Deregistered from Consul");
        Ok(())
    }
}
