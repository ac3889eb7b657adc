//! Client-side validation for the login and registration forms.
//!
//! Runs before any network call; messages match what the backend would send
//! for the same mistakes so users see one wording either way.

pub const MIN_PASSWORD_LEN: usize = 6;

/// A form rejected before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Informe usuário e senha.")]
    MissingCredentials,
    #[error("Todos os campos são obrigatórios")]
    MissingFields,
    #[error("As senhas não conferem")]
    PasswordMismatch,
    #[error("A senha deve ter pelo menos 6 caracteres")]
    PasswordTooShort,
}

/// # Errors
///
/// [`FormError::MissingCredentials`] when either field is blank.
pub fn validate_login(username: &str, password: &str) -> Result<(), FormError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(FormError::MissingCredentials);
    }
    Ok(())
}

/// Checks, in order: all fields present, passwords equal, password length.
///
/// # Errors
///
/// The first [`FormError`] that applies.
pub fn validate_registration(username: &str, email: &str, password: &str, password2: &str) -> Result<(), FormError> {
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() || password2.is_empty() {
        return Err(FormError::MissingFields);
    }
    if password != password2 {
        return Err(FormError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort);
    }
    Ok(())
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
