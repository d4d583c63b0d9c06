//! Password policy enforcement for new passwords.

use taskhub_core::config::AuthConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
    /// Minimum zxcvbn score (0-4).
    min_score: zxcvbn::Score,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let min_score = match config.password_min_score {
            0 => zxcvbn::Score::Zero,
            1 => zxcvbn::Score::One,
            2 => zxcvbn::Score::Two,
            3 => zxcvbn::Score::Three,
            _ => zxcvbn::Score::Four,
        };
        Self {
            min_length: config.password_min_length as usize,
            min_score,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or an error describing the first violation found.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.len() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if estimate.score() < self.min_score {
            return Err(AppError::validation(
                "Password is too weak. Please use a longer or less predictable password.",
            ));
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> AppResult<()> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            jwt_secret: "secret".to_string(),
            jwt_access_ttl_minutes: 15,
            jwt_refresh_ttl_hours: 168,
            password_min_length: 8,
            password_min_score: 2,
        })
    }

    #[test]
    fn test_rejects_short_password() {
        assert!(validator().validate("Ab1!").is_err());
    }

    #[test]
    fn test_rejects_predictable_password() {
        assert!(validator().validate("password").is_err());
    }

    #[test]
    fn test_accepts_strong_password() {
        assert!(validator().validate("mallard-Quartz-41").is_ok());
    }

    #[test]
    fn test_rejects_unchanged_password() {
        assert!(
            validator()
                .validate_not_same("same-Thing-7", "same-Thing-7")
                .is_err()
        );
        assert!(
            validator()
                .validate_not_same("old-Thing-7", "new-Thing-8")
                .is_ok()
        );
    }
}
