//! One-time-code password reset.
//!
//! The flow moves a browser session through
//! `REQUESTED -> OTP_ISSUED -> VERIFIED -> RESET`. The issued code lives in
//! the expiring store under a key derived from the email; the session side
//! is a second entry keyed by a random id kept in a cookie. Expiry is the
//! store's business: an entry past its TTL reads back as absent.

use anyhow::anyhow;
use rand::Rng;
use sams_cache::keys;
use sams_cache::store::{ExpiringStore, get_json, put_json};
use sams_config::otp::OtpConfig;
use sams_core::hash_password;
use sams_models::{Email, ResetPasswordForm};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use crate::metrics::{track_otp_issued, track_password_reset};
use crate::modules::users::service::UserService;
use crate::utils::email::{Mailer, OutgoingEmail};
use crate::utils::errors::AppError;

/// What the session remembers between steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReset {
    pub email: Email,
    pub verified: bool,
}

pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

fn generate_session_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// The reset flow bound to one store.
#[derive(Debug, Clone, Copy)]
pub struct PasswordResetService<'a> {
    store: &'a dyn ExpiringStore,
    prefix: &'a str,
    config: &'a OtpConfig,
}

impl<'a> PasswordResetService<'a> {
    pub fn new(store: &'a dyn ExpiringStore, prefix: &'a str, config: &'a OtpConfig) -> Self {
        Self {
            store,
            prefix,
            config,
        }
    }

    /// Stores a fresh code for `email`, mails it and opens a session.
    /// Returns the new session id. If the mail cannot be sent the code is
    /// withdrawn and no session is opened.
    #[instrument(skip(self, email, mailer), fields(email = %email))]
    pub async fn issue(&self, email: &Email, mailer: &dyn Mailer) -> Result<String, AppError> {
        let code = generate_code();
        let otp_key = keys::otp(self.prefix, email.as_str());

        self.store
            .put(&otp_key, code.clone(), self.config.code_ttl)
            .await?;

        let message = OutgoingEmail::password_reset_otp(
            email.as_str(),
            &code,
            self.config.code_ttl_minutes(),
        );
        if let Err(err) = mailer.send(&message).await {
            self.store.remove(&otp_key).await?;
            return Err(err);
        }

        let session_id = generate_session_id();
        self.save_session(
            &session_id,
            &PendingReset {
                email: email.clone(),
                verified: false,
            },
        )
        .await?;

        track_otp_issued();
        tracing::info!("Password reset code issued");

        Ok(session_id)
    }

    /// The session's pending reset, if it has not expired.
    pub async fn pending(&self, session_id: &str) -> Result<Option<PendingReset>, AppError> {
        let key = keys::reset_session(self.prefix, session_id);
        Ok(get_json(self.store, &key).await?)
    }

    /// Compares `code` exactly against the stored one and marks the
    /// session verified. On a mismatch nothing changes.
    #[instrument(skip(self, pending, code))]
    pub async fn verify(
        &self,
        session_id: &str,
        pending: &PendingReset,
        code: &str,
    ) -> Result<(), AppError> {
        let stored = self
            .store
            .get(&keys::otp(self.prefix, pending.email.as_str()))
            .await?;

        if stored.as_deref() != Some(code) {
            tracing::warn!("Password reset code rejected");
            return Err(AppError::validation(anyhow!("Invalid or expired OTP.")));
        }

        self.save_session(
            session_id,
            &PendingReset {
                verified: true,
                ..pending.clone()
            },
        )
        .await
    }

    /// Sets the new password for a verified session, then forgets both the
    /// code and the session.
    #[instrument(skip(self, db, pending, form))]
    pub async fn reset(
        &self,
        db: &PgPool,
        session_id: &str,
        pending: &PendingReset,
        form: &ResetPasswordForm,
    ) -> Result<(), AppError> {
        if !pending.verified {
            return Err(AppError::forbidden(anyhow!(
                "Please verify the code from your email first."
            )));
        }
        if !form.passwords_match() {
            return Err(AppError::validation(anyhow!("Passwords do not match.")));
        }

        let hash = hash_password(&form.new_password)?;
        UserService::set_password(db, &pending.email, &hash).await?;

        self.finish(session_id, pending).await?;

        track_password_reset();
        tracing::info!("Password reset completed");

        Ok(())
    }

    /// Drops the stored code and the session entry.
    pub async fn finish(&self, session_id: &str, pending: &PendingReset) -> Result<(), AppError> {
        self.store
            .remove(&keys::otp(self.prefix, pending.email.as_str()))
            .await?;
        self.store
            .remove(&keys::reset_session(self.prefix, session_id))
            .await?;
        Ok(())
    }

    async fn save_session(&self, session_id: &str, pending: &PendingReset) -> Result<(), AppError> {
        let key = keys::reset_session(self.prefix, session_id);
        put_json(self.store, &key, pending, self.config.session_ttl).await?;
        Ok(())
    }
}
