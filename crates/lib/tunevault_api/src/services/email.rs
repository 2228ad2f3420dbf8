//! Outbound mail: SMTP (or console) transport behind a fire-and-forget
//! outbox queue.
//!
//! Requests only enqueue; a single worker task drains the queue and
//! logs delivery failures. Nothing in the request path ever waits on
//! or fails from mail delivery.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

/// A queued outbound email.
#[derive(Debug)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    /// The OTP email sent by the recovery flow.
    pub fn otp(to: impl Into<String>, code: &str, validity_minutes: i64) -> Self {
        OutboundEmail {
            to: to.into(),
            subject: "Tunevault verification code".to_string(),
            body: format!(
                "Your verification code is {code}.\n\n\
                 It is valid for {validity_minutes} minutes. \
                 Do not share it with anyone; if you did not request it, \
                 ignore this message.\n"
            ),
        }
    }
}

/// Mail transport: a real SMTP relay, or console logging when no relay
/// is configured (dev and test).
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    Console,
}

impl Mailer {
    /// Build the transport from configuration.
    pub fn from_config(config: &ApiConfig) -> AppResult<Mailer> {
        let Some(smtp) = &config.smtp else {
            return Ok(Mailer::Console);
        };
        let from: Mailbox = config
            .mail_from
            .parse()
            .map_err(|_| AppError::EmailSendFailed)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|_| AppError::EmailSendFailed)?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();
        Ok(Mailer::Smtp { transport, from })
    }

    /// Deliver one email. Only the outbox worker calls this.
    pub async fn send(&self, mail: &OutboundEmail) -> AppResult<()> {
        match self {
            Mailer::Smtp { transport, from } => {
                let to: Mailbox = mail.to.parse().map_err(|_| AppError::EmailSendFailed)?;
                let message = Message::builder()
                    .from(from.clone())
                    .to(to)
                    .subject(&mail.subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(mail.body.clone())
                    .map_err(|_| AppError::EmailSendFailed)?;
                transport
                    .send(message)
                    .await
                    .map_err(|_| AppError::EmailSendFailed)?;
                Ok(())
            }
            Mailer::Console => {
                info!(to = %mail.to, subject = %mail.subject, "console mail transport");
                Ok(())
            }
        }
    }
}

/// Handle for enqueueing outbound mail from request handlers.
#[derive(Clone)]
pub struct EmailOutbox {
    tx: mpsc::UnboundedSender<OutboundEmail>,
}

impl EmailOutbox {
    /// Spawn the worker task draining the queue through `mailer`.
    pub fn spawn(mailer: Mailer) -> EmailOutbox {
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundEmail>();
        tokio::spawn(async move {
            while let Some(mail) = rx.recv().await {
                if let Err(e) = mailer.send(&mail).await {
                    error!(to = %mail.to, error = %e, "email dispatch failed");
                }
            }
        });
        EmailOutbox { tx }
    }

    /// Queue an email for delivery. Never blocks, never fails the caller.
    pub fn enqueue(&self, mail: OutboundEmail) {
        if self.tx.send(mail).is_err() {
            error!("mail outbox worker is gone; dropping email");
        }
    }
}
