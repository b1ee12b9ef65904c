//! Mailgate server
//!
//! Two ingress paths feed one [`DispatchEngine`](email_service::DispatchEngine):
//! `POST /` over HTTP and a NATS queue subscription on the `mail` subject.
//! Both acknowledge receipt, not delivery.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod subscriber;

pub use config::ServerConfig;
pub use error::*;
pub use server::MailServer;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the application router with all routes and middleware
pub fn create_app(server: MailServer) -> Router {
    routes::create_routes()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(server)
}
