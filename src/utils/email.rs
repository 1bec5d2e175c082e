use std::fmt;
use std::future::Future;
use std::pin::Pin;

use anyhow::anyhow;
use lettre::message::header;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use sams_config::EmailConfig;
use tracing::instrument;

use crate::utils::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn password_reset_otp(to: &str, otp: &str, ttl_minutes: u64) -> Self {
        Self::new(
            to,
            "SAMS Password Reset OTP",
            format!("Your OTP is {}. It will expire in {} minutes.", otp, ttl_minutes),
        )
    }

    pub fn low_attendance_alert(to: &str, student_name: &str, percentage: f64) -> Self {
        Self::new(
            to,
            format!("Low Attendance Alert for {}", student_name),
            format!(
                "Dear Parent,\n\n\
                 Your child {} has an overall attendance of {}%, which is below the required 75%.\n\
                 Please make sure they attend classes regularly.\n\n\
                 Regards,\n\
                 SAMS",
                student_name, percentage
            ),
        )
    }
}

pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'a>>;

/// Outbound mail. Failures come back as `ErrorKind::ExternalService`.
pub trait Mailer: Send + Sync + fmt::Debug {
    fn send<'a>(&'a self, email: &'a OutgoingEmail) -> SendFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, email), fields(to = %email.to, subject = %email.subject))]
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::info!(body = %email.body, "SMTP disabled, email not sent");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let message = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(anyhow!("Invalid from email: {}", e)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| AppError::external(anyhow!("Failed to send email: {}", e)))?)
            .subject(email.subject.clone())
            .header(header::ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| AppError::internal(anyhow!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| AppError::external(anyhow!("Failed to send email: {}", e)))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::internal(anyhow!("Task join error: {}", e)))?
            .map_err(|e| AppError::external(anyhow!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

impl Mailer for EmailService {
    fn send<'a>(&'a self, email: &'a OutgoingEmail) -> SendFuture<'a> {
        Box::pin(self.deliver(email))
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingMailer;

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every message instead of sending it. A failing mailer refuses
    /// every message without recording it.
    #[derive(Debug, Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        failure: Option<String>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(reason: &str) -> Self {
            Self {
                sent: Mutex::default(),
                failure: Some(reason.to_string()),
            }
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    impl Mailer for RecordingMailer {
        fn send<'a>(&'a self, email: &'a OutgoingEmail) -> SendFuture<'a> {
            Box::pin(async move {
                if let Some(reason) = &self.failure {
                    return Err(AppError::external(anyhow!(
                        "Failed to send email: {}",
                        reason
                    )));
                }
                if let Ok(mut sent) = self.sent.lock() {
                    sent.push(email.clone());
                }
                Ok(())
            })
        }
    }
}
