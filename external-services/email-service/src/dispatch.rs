use std::sync::Arc;

use logger_redacted::{Redacted, RedactedEmail};
use mail_common::{MailEnvelope, MailMessage};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EmailConfig;
use crate::error::{EmailError, EmailResult};
use crate::provider::MailProvider;

/// Single-worker mail dispatcher.
///
/// Ingress hands messages over a bounded queue; one background task drains
/// it and calls the provider, so provider calls happen in submission order.
/// A full queue blocks [`submit`](Self::submit) until the worker catches up.
///
/// Cancellation is cooperative and only observed between messages: a send
/// already in progress is never interrupted. Messages still queued when the
/// engine closes are dropped.
pub struct DispatchEngine {
    queue: Option<mpsc::Sender<MailMessage>>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    default_sender: String,
}

impl Default for DispatchEngine {
    /// An engine that was never started; every submit fails with
    /// [`EmailError::NotInitialized`].
    fn default() -> Self {
        Self {
            queue: None,
            cancel: CancellationToken::new(),
            worker: Mutex::new(None),
            default_sender: mail_common::DEFAULT_SENDER.to_string(),
        }
    }
}

impl DispatchEngine {
    /// Spawn the worker and return a running engine. Must be called inside a
    /// tokio runtime. A capacity of zero is treated as one.
    pub fn start(
        provider: Arc<dyn MailProvider>,
        default_sender: impl Into<String>,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();

        info!(provider = provider.name(), capacity = capacity.max(1), "Starting mail dispatcher");
        let handle = tokio::spawn(run_worker(rx, provider, cancel.clone()));

        Self {
            queue: Some(tx),
            cancel,
            worker: Mutex::new(Some(handle)),
            default_sender: default_sender.into(),
        }
    }

    pub fn from_config(config: EmailConfig) -> EmailResult<Self> {
        let provider = config.provider.build(config.email_enabled)?;
        Ok(Self::start(provider, config.from_email, config.queue_capacity))
    }

    /// False once closed or once the worker has exited for any reason.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
            && self.queue.as_ref().is_some_and(|queue| !queue.is_closed())
    }

    /// Queue a message for delivery.
    ///
    /// Returns once the worker queue accepted the message, not once it was
    /// delivered. Provider failures are only logged.
    pub async fn submit(&self, message: MailMessage) -> EmailResult<()> {
        let queue = self.queue.as_ref().ok_or(EmailError::NotInitialized)?;

        if self.cancel.is_cancelled() {
            return Err(EmailError::EngineClosed);
        }

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(EmailError::EngineClosed),
            sent = queue.send(message) => sent.map_err(|_| EmailError::EngineClosed),
        }
    }

    /// Convert a wire envelope, filling the default sender, and submit it.
    pub async fn submit_envelope(&self, envelope: MailEnvelope) -> EmailResult<()> {
        let message = envelope.into_message(&self.default_sender)?;
        self.submit(message).await
    }

    /// Signal the worker to stop. Idempotent; does not wait for the worker.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            info!("Closing mail dispatcher");
        }
        self.cancel.cancel();
    }

    /// Close and wait for the worker to exit, letting an in-flight send finish.
    pub async fn shutdown(&self) {
        self.close();
        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Mail dispatcher worker ended abnormally");
            }
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<MailMessage>,
    provider: Arc<dyn MailProvider>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(message) => deliver(provider.as_ref(), &message).await,
                None => break,
            },
        }
    }

    let dropped = drain_count(&mut rx);
    if dropped > 0 {
        warn!(dropped, "Mail dispatcher stopped with undelivered messages");
    }
    info!("Mail dispatcher worker stopped");
}

async fn deliver(provider: &dyn MailProvider, message: &MailMessage) {
    let recipient = RedactedEmail(message.recipient());
    debug!(recipient = %recipient, provider = provider.name(), "Sending mail");

    match provider.send(message).await {
        Ok(tracking_id) => {
            info!(recipient = %recipient, tracking_id = %tracking_id, "Mail sent");
        }
        Err(e) => {
            warn!(recipient = %recipient, error = %Redacted(&e), "Mail delivery failed");
        }
    }
}

fn drain_count(rx: &mut mpsc::Receiver<MailMessage>) -> usize {
    rx.close();
    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    count
}
