use crate::{config::email::EmailConfig, utils::jwt::reset_token_expiry_hours};
use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: Option<String>,
    client_url: String,
}

impl EmailService {
    /// Build from environment variables. If SMTP is not configured, email
    /// sending is silently skipped (graceful degradation).
    pub fn from_env() -> Self {
        match EmailConfig::from_env() {
            Some(cfg) => {
                let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
                    .map(|builder| builder.port(cfg.smtp_port).credentials(creds).build());

                match transport {
                    Ok(t) => Self {
                        transport: Some(t),
                        from_address: Some(cfg.from_address),
                        client_url: cfg.client_url,
                    },
                    Err(e) => {
                        tracing::warn!("Failed to build SMTP transport: {e}");
                        Self {
                            transport: None,
                            from_address: None,
                            client_url: cfg.client_url,
                        }
                    }
                }
            }
            None => {
                let client_url = std::env::var("CLIENT_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string());
                Self {
                    transport: None,
                    from_address: None,
                    client_url,
                }
            }
        }
    }

    /// Returns true if SMTP is configured and available.
    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Welcome email with the account-verification link. The optional
    /// `redirect` is carried through so the client can land the user on
    /// the page they came from after verifying.
    pub async fn send_account_email(
        &self,
        to: &str,
        first_name: &str,
        token: &str,
        redirect: Option<&str>,
    ) -> Result<()> {
        let mut link = format!("{}/verify-email/{}", self.client_url, token);
        if let Some(redirect) = redirect {
            link.push_str("?redirect=");
            link.push_str(redirect);
        }
        let body = format!(
            "Hi {first_name},\n\nWelcome! Please verify your email address by clicking the link below:\n\n{link}\n\nThis link expires in 7 days. You cannot login until your email is verified.",
        );

        self.send_email(to, "Verify your email address", &body).await
    }

    /// Reset-password email. Unlike the welcome email, a failure here
    /// must reach the caller so the persisted reset token can be rolled
    /// back.
    pub async fn send_reset_password_email(
        &self,
        to: &str,
        first_name: &str,
        user_id: i32,
        token: &str,
    ) -> Result<()> {
        let link = format!("{}/auth/reset/{}?token={}", self.client_url, user_id, token);
        let hours = reset_token_expiry_hours();
        let body = format!(
            "Hi {first_name},\n\nA password reset was requested for your account.\n\nClick the link below to choose a new password:\n\n{link}\n\nThis link expires in {hours} hour(s) and can be used only once. If you did not request this, you can safely ignore this email.",
        );

        self.send_email(to, "Reset your password", &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let transport = match &self.transport {
            Some(t) => t,
            None => {
                tracing::debug!("SMTP not configured, skipping email to {to}");
                return Ok(());
            }
        };
        let from_address = match &self.from_address {
            Some(f) => f,
            None => return Ok(()),
        };

        let from_mailbox: Mailbox =
            from_address
                .parse()
                .map_err(|e: lettre::address::AddressError| {
                    anyhow::anyhow!("Invalid from address '{}': {}", from_address, e)
                })?;
        let to_mailbox: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
            anyhow::anyhow!("Invalid to address '{}': {}", to, e)
        })?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(email).await?;
        tracing::info!("Email sent to {to}: {subject}");
        Ok(())
    }
}
