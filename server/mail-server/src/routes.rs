use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{health, mail},
    server::MailServer,
};

/// Create health check routes
pub fn health_routes() -> Router<MailServer> {
    Router::new().route("/health", get(health::health_check))
}

/// Mail ingress lives at the root path
pub fn mail_routes() -> Router<MailServer> {
    Router::new().route("/", post(mail::submit_mail))
}

pub fn create_routes() -> Router<MailServer> {
    Router::new().merge(mail_routes()).merge(health_routes())
}
