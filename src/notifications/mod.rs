//! Outgoing mail.
//!
//! Request handlers only enqueue a [`MailMessage`]; a background task owns the
//! [`Mailer`] and performs delivery. Delivery errors are logged and dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

pub mod expense_created;
pub mod mailer;

pub use mailer::{Address, LogMailer, MailMessage, Mailer};

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<MailMessage>,
}

impl Notifier {
    /// Starts the delivery worker on the current runtime.
    pub fn spawn(mailer: Arc<dyn Mailer>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, mailer));
        Self { tx }
    }

    /// Queues a mail without waiting for delivery.
    pub fn dispatch(&self, message: MailMessage) {
        let to = message.to.email.clone();
        if self.tx.send(message).is_err() {
            warn!(to = %to, "mail worker stopped; notification dropped");
        } else {
            debug!(to = %to, "notification queued");
        }
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<MailMessage>, mailer: Arc<dyn Mailer>) {
    while let Some(message) = rx.recv().await {
        let to = message.to.email.clone();
        let subject = message.subject.clone();
        if let Err(e) = mailer.send(message).await {
            error!(error = ?e, to = %to, subject = %subject, "mail delivery failed");
        }
    }
    debug!("mail worker finished");
}
