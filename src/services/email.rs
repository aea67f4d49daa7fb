use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

pub struct SmtpEmailSender {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let from: Mailbox = format!("{} <{}>", config.business_name, config.smtp_from)
            .parse()
            .with_context(|| format!("invalid SMTP_FROM address: {}", config.smtp_from))?;

        let tls = TlsParameters::new(config.smtp_host.clone())
            .context("failed to build SMTP TLS parameters")?;
        let tls = if config.smtp_starttls {
            Tls::Required(tls)
        } else {
            Tls::Wrapper(tls)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .tls(tls);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let to: Mailbox = message
            .to
            .parse()
            .with_context(|| format!("invalid recipient address: {}", message.to))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.html.clone()),
                    ),
            )
            .context("failed to build email")?;

        self.transport
            .send(email)
            .await
            .context("failed to send email over SMTP")?;

        tracing::info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}
