//! Acquisition of passwords for encrypted keys.

use std::{fmt::Debug, path::PathBuf, sync::Arc};

use jose_crypto::Passphrase;
use log::debug;

use crate::{Error, options::Context, prompt::PasswordPrompter};

/// A strategy for acquiring the password of an encrypted key
#[derive(Clone)]
pub enum PasswordSource {
    /// A password that is provided directly
    Literal(Passphrase),

    /// A file containing the password
    ///
    /// The file is read when the password is needed and trailing whitespace is removed.
    File(PathBuf),

    /// A prompter that is asked for the password
    Prompter {
        /// The message shown when prompting.
        prompt: String,

        /// The prompter.
        prompter: Arc<dyn PasswordPrompter>,
    },
}

impl PasswordSource {
    /// Returns the name of the strategy, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "password",
            Self::File(_) => "password file",
            Self::Prompter { .. } => "password prompter",
        }
    }
}

impl Debug for PasswordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(_) => f.debug_tuple("Literal").field(&"[REDACTED]").finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Prompter { prompt, .. } => f
                .debug_struct("Prompter")
                .field("prompt", prompt)
                .finish_non_exhaustive(),
        }
    }
}

/// Returns the message used when prompting for the password of `location`.
pub(crate) fn prompt_message(location: &str) -> String {
    format!("Please enter the password to decrypt {location}")
}

/// Acquires the password for decrypting the data at `location`.
///
/// Uses the password source of `context`, or asks the default prompter of `context` if no
/// password source is configured.
///
/// # Errors
///
/// Returns an error if
///
/// - the password file can not be read ([`Error::Io`]),
/// - or the prompter fails ([`Error::Prompt`]).
pub(crate) fn acquire_password(context: &Context, location: &str) -> Result<Passphrase, Error> {
    match context.password_source() {
        Some(PasswordSource::Literal(passphrase)) => Ok(passphrase.clone()),
        Some(PasswordSource::File(path)) => {
            debug!("Reading password for {location} from {}", path.display());
            let contents = std::fs::read(path).map_err(|error| Error::Io {
                path: path.clone(),
                error,
            })?;
            Ok(Passphrase::from_file_contents(contents))
        }
        Some(PasswordSource::Prompter { prompt, prompter }) => {
            let message = if prompt.is_empty() {
                prompt_message(location)
            } else {
                prompt.clone()
            };
            prompter.prompt(&message).map_err(|error| Error::Prompt {
                location: location.to_string(),
                error,
            })
        }
        None => {
            debug!("Prompting for the password of {location}");
            context
                .default_prompter()
                .prompt(&prompt_message(location))
                .map_err(|error| Error::Prompt {
                    location: location.to_string(),
                    error,
                })
        }
    }
}
