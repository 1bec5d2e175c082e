//! Login and password-reset forms.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpForm {
    #[validate(length(min = 1, message = "Enter the code from your email"))]
    #[schema(example = "493021")]
    pub otp: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordForm {
    #[validate(length(min = 1, message = "Password is required"))]
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn passwords_match(&self) -> bool {
        self.new_password == self.confirm_password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_requires_email_shape() {
        let form = LoginForm {
            email: "nobody".to_string(),
            password: "x".to_string(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_passwords_match() {
        let form = ResetPasswordForm {
            new_password: "abc12345".to_string(),
            confirm_password: "abc12345".to_string(),
        };
        assert!(form.passwords_match());

        let form = ResetPasswordForm {
            confirm_password: "abc1234".to_string(),
            ..form
        };
        assert!(!form.passwords_match());
    }
}
