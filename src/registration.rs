//! Backend account registration.

use tracing::info;

use crate::api::{AccountRegistrar, SessionToken};
use crate::config::Secret;
use crate::error::{RelayError, Result};

/// Create a backend account once the form checks out.
///
/// Nothing is sent when the email is blank or the password confirmation
/// does not match.
pub async fn register_account<R: AccountRegistrar>(
    registrar: &R,
    email: &str,
    password: &Secret,
    confirmation: &Secret,
) -> Result<SessionToken> {
    let email = email.trim();
    if email.is_empty() {
        return Err(RelayError::validation("Invalid email."));
    }
    if password.is_empty() {
        return Err(RelayError::validation("Invalid password."));
    }
    if confirmation.is_empty() || password != confirmation {
        return Err(RelayError::validation(
            "Password confirmation does not match the password.",
        ));
    }

    let token = registrar.register(email, password).await?;
    info!(email = %email, "Registered backend account");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fakes::FakeBackend;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_mismatched_confirmation_sends_nothing() {
        let backend = FakeBackend::default();

        let result = register_account(
            &backend,
            "me@example.com",
            &Secret::from("first"),
            &Secret::from("second"),
        )
        .await;

        assert_err!(&result);
        assert!(backend.registrations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_email_sends_nothing() {
        let backend = FakeBackend::default();
        let result = register_account(&backend, "  ", &Secret::from("pw"), &Secret::from("pw")).await;

        assert_err!(&result);
        assert!(backend.registrations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_matching_confirmation_registers() {
        let backend = FakeBackend::default();

        let token = assert_ok!(
            register_account(&backend, "me@example.com", &Secret::from("pw"), &Secret::from("pw")).await
        );

        assert_eq!(token.expose(), "new-account-token");
        assert_eq!(*backend.registrations.lock().unwrap(), vec!["me@example.com".to_string()]);
    }
}
