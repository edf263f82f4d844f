use async_trait::async_trait;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub email: String,
    pub name: String,
}

/// A rendered mail, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: Address,
    pub to: Address,
    pub subject: String,
    /// Markdown body.
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()>;
}

/// Transport that writes every mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        info!(
            from = %message.from.email,
            to = %message.to.email,
            subject = %message.subject,
            body = %message.body,
            "mail sent (log driver)"
        );
        Ok(())
    }
}

impl From<&MailConfig> for Address {
    fn from(cfg: &MailConfig) -> Self {
        Self {
            email: cfg.from_address.clone(),
            name: cfg.from_name.clone(),
        }
    }
}
