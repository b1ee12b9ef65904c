use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use email_service::{DispatchEngine, EmailConfig};
use events_bus::NatsBroker;
use service_directory::{ConsulDirectory, Directory, ServiceInstance};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mail_server::{create_app, subscriber, MailServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();

    init_tracing(config.verbose, config.log_json);

    info!(version = env!("CARGO_PKG_VERSION"), instance = %config.name, "Starting mail server");

    let email_config = EmailConfig::from_env().context("invalid email configuration")?;
    info!(
        provider = ?email_config.provider.provider_type(),
        enabled = email_config.email_enabled,
        sender = %email_config.from_email,
        "Email provider configured"
    );
    let engine = Arc::new(DispatchEngine::from_config(email_config)?);

    let broker = connect_nats(&config).await;
    let subscription = match &broker {
        Some(broker) => {
            match subscriber::start_mail_subscriber(broker, engine.clone(), &config.topic, &config.queue_group)
                .await
            {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "NATS ingress unavailable, serving HTTP only");
                    None
                }
            }
        }
        None => None,
    };

    let instance = config.service_instance();
    let directory = register_instance(&config, &instance).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr()))?;
    info!(address = %config.bind_addr(), "Mail ingress listening");

    let app = create_app(MailServer::new(engine.clone(), broker.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down");

    if let Some(directory) = &directory {
        if let Err(e) = directory.unregister(&instance).await {
            warn!(error = %e, "Failed to unregister from service directory");
        }
    }

    if let Some(broker) = &broker {
        if let Some(id) = &subscription {
            if let Err(e) = broker.unsubscribe(id).await {
                warn!(subscription_id = %id, error = %e, "Failed to stop NATS ingress subscription");
            }
        }
        if let Err(e) = broker.shutdown().await {
            warn!(error = %e, "NATS shutdown did not flush cleanly");
        }
    }

    engine.shutdown().await;
    info!("Mail server stopped");
    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "mail_server={level},email_service={level},events_bus={level},service_directory={level},tower_http=info,async_nats=warn"
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().with_target(false).with_ansi(false).json())
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

async fn connect_nats(config: &ServerConfig) -> Option<Arc<NatsBroker>> {
    let nats_config = config.nats_config()?;

    match NatsBroker::connect(&nats_config).await {
        Ok(broker) => Some(Arc::new(broker)),
        Err(e) => {
            warn!(url = %nats_config.server_url, error = %e, "NATS unreachable, pub/sub ingress disabled");
            None
        }
    }
}

async fn register_instance(
    config: &ServerConfig,
    instance: &ServiceInstance,
) -> anyhow::Result<Option<Arc<dyn Directory>>> {
    let Some(consul_config) = config.consul_config() else {
        info!("No service directory configured, skipping registration");
        return Ok(None);
    };

    let directory: Arc<dyn Directory> = Arc::new(ConsulDirectory::new(consul_config)?);
    directory
        .register(instance)
        .await
        .context("failed to register with service directory")?;

    Ok(Some(directory))
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
