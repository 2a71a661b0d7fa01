//! Interactive password prompts.

use std::fmt::Debug;

use jose_crypto::Passphrase;
use rpassword::prompt_password;

/// An error that may occur when prompting for a password.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading from the terminal failed
    #[error("Unable to read password from terminal: {0}")]
    Terminal(#[source] std::io::Error),

    /// The prompt has been cancelled
    #[error("The password prompt has been cancelled")]
    Cancelled,

    /// A custom prompter failed
    #[error("The password prompt failed: {0}")]
    Custom(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A source of passwords, that is asked with a human readable message.
///
/// The trait is implemented for closures with the signature of [`PasswordPrompter::prompt`], so
/// that applications and tests can provide passwords without a terminal.
pub trait PasswordPrompter: Send + Sync {
    /// Asks for a password using `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if no password can be acquired, e.g. because the prompt was cancelled.
    fn prompt(&self, message: &str) -> Result<Passphrase, Error>;
}

impl<F> PasswordPrompter for F
where
    F: Fn(&str) -> Result<Passphrase, Error> + Send + Sync,
{
    fn prompt(&self, message: &str) -> Result<Passphrase, Error> {
        self(message)
    }
}

/// Prompts for passwords on the controlling terminal, without echoing the input.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompter;

impl PasswordPrompter for TerminalPrompter {
    fn prompt(&self, message: &str) -> Result<Passphrase, Error> {
        let password = prompt_password(format!("{message}: ")).map_err(Error::Terminal)?;
        if password.is_empty() {
            return Err(Error::Cancelled);
        }
        Ok(Passphrase::new(password.into_bytes()))
    }
}
