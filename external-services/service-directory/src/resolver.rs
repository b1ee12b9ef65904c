use std::sync::Arc;

use tracing::debug;

use crate::address::ServiceAddress;
use crate::directory::Directory;
use crate::error::{DirectoryError, DirectoryResult};

/// Picks a concrete address for a service name.
///
/// The first instance the directory reports wins; there is no load
/// balancing across instances.
#[derive(Clone)]
pub struct DirectoryResolver {
    directory: Arc<dyn Directory>,
}

impl DirectoryResolver {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Directory errors are passed through unchanged; an empty instance list
    /// yields [`DirectoryError::NotFound`].
    pub async fn resolve_address(&self, service_name: &str) -> DirectoryResult<ServiceAddress> {
        let addresses = self.directory.services_by_name(service_name).await?;

        let first = addresses.first().ok_or_else(|| DirectoryError::NotFound {
            service: service_name.to_string(),
        })?;

        let address: ServiceAddress = first.parse()?;
        debug!(service = service_name, address = %address, "Resolved service address");
        Ok(address)
    }

    pub async fn has_instances(&self, service_name: &str) -> DirectoryResult<bool> {
        Ok(!self
            .directory
            .services_by_name(service_name)
            .await?
            .is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MockDirectory;
    use mockall::predicate::eq;

    fn resolver_returning(result: fn() -> DirectoryResult<Vec<String>>) -> DirectoryResolver {
        let mut directory = MockDirectory::new();
        directory
            .expect_services_by_name()
            .with(eq("mail"))
            .times(1)
            .returning(move |_| result());
        DirectoryResolver::new(Arc::new(directory))
    }

    #[tokio::test]
    async fn test_resolves_first_address() {
        let resolver =
            resolver_returning(|| Ok(vec!["127.0.0.1:3030".to_string(), "10.0.0.2:3030".to_string()]));

        let address = resolver.resolve_address("mail").await.unwrap();
        assert_eq!(address.host, "127.0.0.1");
        assert_eq!(address.port, 3030);
    }

    #[tokio::test]
    async fn test_empty_list_is_not_found() {
        let resolver = resolver_returning(|| Ok(Vec::new()));

        let result = resolver.resolve_address("mail").await;
        assert!(matches!(result, Err(DirectoryError::NotFound { service }) if service == "mail"));
    }

    #[tokio::test]
    async fn test_directory_error_is_propagated() {
        let resolver =
            resolver_returning(|| Err(DirectoryError::Unavailable("connection refused".to_string())));

        let result = resolver.resolve_address("mail").await;
        assert!(matches!(result, Err(DirectoryError::Unavailable(msg)) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn test_has_instances() {
        let resolver = resolver_returning(|| Ok(vec!["127.0.0.1:3030".to_string()]));
        assert!(resolver.has_instances("mail").await.unwrap());
    }
}
