use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::address::{ServiceAddress, ServiceInstance};
use crate::error::DirectoryResult;

/// Registry of named services.
///
/// `services_by_name` returns the `host:port` strings of every live
/// instance of a service, in the directory's own order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    async fn register(&self, instance: &ServiceInstance) -> DirectoryResult<()>;

    async fn services_by_name(&self, service_name: &str) -> DirectoryResult<Vec<String>>;

    async fn unregister(&self, instance: &ServiceInstance) -> DirectoryResult<()>;
}

/// In-process directory, for single node deployments and tests.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    services: RwLock<HashMap<String, Vec<ServiceInstance>>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `service_name` with fixed addresses, instance names derived from position.
    #[must_use]
    pub fn with_addresses(mut self, service_name: &str, addresses: &[ServiceAddress]) -> Self {
        let entries = self
            .services
            .get_mut()
            .entry(service_name.to_string())
            .or_default();

        for (idx, address) in addresses.iter().enumerate() {
            entries.push(ServiceInstance::new(
                service_name,
                format!("{service_name}{}", idx + 1),
                address.clone(),
            ));
        }
        self
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn register(&self, instance: &ServiceInstance) -> DirectoryResult<()> {
        let mut services = self.services.write().await;
        let entries = services.entry(instance.service_name.clone()).or_default();

        // Re-registering an instance replaces its address.
        entries.retain(|existing| existing.instance_name != instance.instance_name);
        entries.push(instance.clone());

        debug!(
            service = %instance.service_name,
            instance = %instance.instance_name,
            address = %instance.address,
            "Registered service instance"
        );
        Ok(())
    }

    async fn services_by_name(&self, service_name: &str) -> DirectoryResult<Vec<String>> {
        let services = self.services.read().await;
        Ok(services
            .get(service_name)
            .map(|entries| entries.iter().map(|i| i.address.to_string()).collect())
            .unwrap_or_default())
    }

    async fn unregister(&self, instance: &ServiceInstance) -> DirectoryResult<()> {
        let mut services = self.services.write().await;
        if let Some(entries) = services.get_mut(&instance.service_name) {
            entries.retain(|existing| existing.instance_name != instance.instance_name);
            if entries.is_empty() {
                services.remove(&instance.service_name);
            }
        }
        Ok(())
    }
}
