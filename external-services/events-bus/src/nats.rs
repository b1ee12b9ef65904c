use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_nats::connection::State;
use futures::StreamExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use logger_redacted::Redacted;

use crate::error::{EventBusError, Result};

/// NATS connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub server_url: String,
    /// Name reported to the server for this connection
    pub connection_name: Option<String>,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            server_url: "nats://localhost:4222".to_string(),
            connection_name: Some("mailgate".to_string()),
        }
    }
}

/// Thin NATS broker with JSON payloads.
///
/// Publishing is fire-and-forget: a publish returns once the payload is
/// handed to the client, no acknowledgement is awaited. Subscriptions run
/// on background tasks tracked by id.
pub struct NatsBroker {
    client: async_nats::Client,
    subscriptions: Arc<RwLock<HashMap<String, JoinHandle<()>>>>,
}

impl NatsBroker {
    pub async fn connect(config: &NatsConfig) -> Result<Self> {
        let client = Self::options(config)
            .connect(config.server_url.as_str())
            .await
            .map_err(|e| EventBusError::BrokerConnectionError(e.to_string()))?;

        info!(url = %config.server_url, "Connected to NATS");
        Ok(Self::from_client(client))
    }

    /// Return at once and keep connecting in the background.
    ///
    /// Publishes are buffered by the client until the server is reachable.
    pub async fn connect_lazy(config: &NatsConfig) -> Result<Self> {
        let client = Self::options(config)
            .retry_on_initial_connect()
            .connect(config.server_url.as_str())
            .await
            .map_err(|e| EventBusError::BrokerConnectionError(e.to_string()))?;

        debug!(url = %config.server_url, "NATS connection pending");
        Ok(Self::from_client(client))
    }

    fn options(config: &NatsConfig) -> async_nats::ConnectOptions {
        let options = async_nats::ConnectOptions::new();
        match &config.connection_name {
            Some(name) => options.name(name),
            None => options,
        }
    }

    pub fn from_client(client: async_nats::Client) -> Self {
        Self {
            client,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    /// Live connection state of the underlying client.
    pub fn is_connected(&self) -> bool {
        matches!(self.client.connection_state(), State::Connected)
    }

    pub async fn publish_json<T>(&self, subject: &str, payload: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.publish_bytes(subject, serde_json::to_vec(payload)?).await
    }

    /// Publish an already encoded payload.
    pub async fn publish_bytes(&self, subject: &str, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();

        self.client
            .publish(subject.to_string(), bytes.into())
            .await
            .map_err(|e| EventBusError::PublishError(e.to_string()))?;

        debug!(subject, size, "Published message");
        Ok(())
    }

    /// Join `queue_group` on `subject` and feed every decoded payload to `handler`.
    ///
    /// Each delivered message is handled on its own task. Messages that fail
    /// to decode are logged and dropped. Returns the subscription id.
    pub async fn queue_subscribe_json<T, F, Fut>(
        &self,
        subject: &str,
        queue_group: &str,
        handler: F,
    ) -> Result<String>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| EventBusError::SubscriptionError(e.to_string()))?;

        let subscription_id = Uuid::new_v4().to_string();
        let subject = subject.to_string();

        let handle = tokio::spawn(async move {
            while let Some(message) = subscriber.next().await {
                match serde_json::from_slice::<T>(&message.payload) {
                    Ok(payload) => {
                        tokio::spawn(handler(payload));
                    }
                    Err(e) => {
                        warn!(subject = %subject, error = %Redacted(&e), "Dropping undecodable message");
                    }
                }
            }
            debug!(subject = %subject, "Subscription stream ended");
        });

        info!(subscription_id = %subscription_id, queue_group, "Queue subscription started");
        self.subscriptions
            .write()
            .await
            .insert(subscription_id.clone(), handle);
        Ok(subscription_id)
    }

    pub async fn unsubscribe(&self, subscription_id: &str) -> Result<()> {
        if let Some(handle) = self.subscriptions.write().await.remove(subscription_id) {
            handle.abort();
        }
        Ok(())
    }

    /// Stop every subscription and flush pending publishes.
    pub async fn shutdown(&self) -> Result<()> {
        for (_, handle) in self.subscriptions.write().await.drain() {
            handle.abort();
        }

        self.client
            .flush()
            .await
            .map_err(|e| EventBusError::PublishError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        text: String,
    }

    fn nats_url() -> String {
        std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
    }

    #[test]
    fn test_default_config() {
        let config = NatsConfig::default();
        assert_eq!(config.server_url, "nats://localhost:4222");
        assert_eq!(config.connection_name.as_deref(), Some("mailgate"));
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_fails() {
        let config = NatsConfig {
            server_url: "nats://127.0.0.1:1".to_string(),
            connection_name: None,
        };

        let result = NatsBroker::connect(&config).await;
        assert!(matches!(result, Err(EventBusError::BrokerConnectionError(_))));
    }

    #[tokio::test]
    async fn test_lazy_connect_starts_disconnected() {
        let config = NatsConfig {
            server_url: "nats://127.0.0.1:1".to_string(),
            connection_name: None,
        };

        let broker = NatsBroker::connect_lazy(&config).await.unwrap();
        assert!(!broker.is_connected());
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_id_is_ok() {
        let config = NatsConfig {
            server_url: "nats://127.0.0.1:1".to_string(),
            connection_name: None,
        };
        let broker = NatsBroker::connect_lazy(&config).await.unwrap();

        assert!(broker.unsubscribe("missing").await.is_ok());
    }

    #[tokio::test]
    #[ignore = "requires a running NATS server (NATS_URL)"]
    async fn test_queue_subscribe_receives_published_json() {
        let config = NatsConfig {
            server_url: nats_url(),
            ..Default::default()
        };
        let broker = NatsBroker::connect(&config).await.unwrap();
        assert!(broker.is_connected());

        let (tx, mut rx) = mpsc::channel(1);
        broker
            .queue_subscribe_json("test.ping", "testers", move |ping: Ping| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(ping).await;
                }
            })
            .await
            .unwrap();
        broker.client().flush().await.unwrap();

        broker
            .publish_json("test.ping", &Ping { text: "hello".to_string() })
            .await
            .unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.text, "hello");

        broker.shutdown().await.unwrap();
    }
}
