//! Options for the resolution of keys and the resulting [`Context`].

use std::{fmt::Debug, path::PathBuf, str::FromStr, sync::Arc};

use jose_crypto::Passphrase;

use crate::{
    algorithm::{Algorithm, KeyUse},
    fetch::{Fetch, HttpsFetcher},
    password::PasswordSource,
    prompt::{PasswordPrompter, TerminalPrompter},
};

/// An error that may occur when building a [`Context`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// More than one password source is configured
    #[error("Only one password source can be used, but {first} and {second} are configured")]
    ConflictingPasswordSources {
        /// The password source configured first.
        first: &'static str,

        /// The conflicting password source.
        second: &'static str,
    },

    /// The key use is neither "sig" nor "enc"
    #[error("Invalid key use {value:?}, expected \"sig\" or \"enc\"")]
    InvalidKeyUse {
        /// The invalid value.
        value: String,
    },

    /// More than one fetcher is configured
    #[error("Only one fetcher can be used")]
    ConflictingFetchers,
}

/// A single option for the resolution of a key
///
/// Options are created with the `with_*` functions of this module and combined into a
/// [`Context`] with [`Context::apply`].
#[derive(Clone)]
pub enum KeyOption {
    /// Use a password provided directly
    Password(Passphrase),

    /// Read the password from a file
    PasswordFile(PathBuf),

    /// Ask a prompter for the password
    PasswordPrompter {
        /// The message shown when prompting.
        prompt: String,

        /// The prompter.
        prompter: Arc<dyn PasswordPrompter>,
    },

    /// Override the algorithm of the key
    Algorithm(Option<Algorithm>),

    /// Override the use of the key
    KeyUse(String),

    /// Override the key ID or select a key from a key set
    KeyId(Option<String>),

    /// Trust algorithm overrides without validation
    Subtle(bool),

    /// Do not infer algorithms and key IDs
    NoDefaults(bool),

    /// Verify declared key IDs of private keys against their thumbprint
    VerifyKeyId(bool),

    /// Replace the prompter used if no password source is configured
    DefaultPrompter(Arc<dyn PasswordPrompter>),

    /// Replace the fetcher for remote locations
    Fetcher(Arc<dyn Fetch>),

    /// Override the label of the source in messages
    SourceLabel(String),
}

impl Debug for KeyOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password(_) => f.debug_tuple("Password").field(&"[REDACTED]").finish(),
            Self::PasswordFile(path) => f.debug_tuple("PasswordFile").field(path).finish(),
            Self::PasswordPrompter { prompt, .. } => f
                .debug_struct("PasswordPrompter")
                .field("prompt", prompt)
                .finish_non_exhaustive(),
            Self::Algorithm(algorithm) => f.debug_tuple("Algorithm").field(algorithm).finish(),
            Self::KeyUse(key_use) => f.debug_tuple("KeyUse").field(key_use).finish(),
            Self::KeyId(key_id) => f.debug_tuple("KeyId").field(key_id).finish(),
            Self::Subtle(subtle) => f.debug_tuple("Subtle").field(subtle).finish(),
            Self::NoDefaults(no_defaults) => f.debug_tuple("NoDefaults").field(no_defaults).finish(),
            Self::VerifyKeyId(verify) => f.debug_tuple("VerifyKeyId").field(verify).finish(),
            Self::DefaultPrompter(_) => f.debug_tuple("DefaultPrompter").finish_non_exhaustive(),
            Self::Fetcher(fetcher) => f.debug_tuple("Fetcher").field(fetcher).finish(),
            Self::SourceLabel(label) => f.debug_tuple("SourceLabel").field(label).finish(),
        }
    }
}

/// Uses `password` to decrypt encrypted keys.
pub fn with_password(password: impl Into<Passphrase>) -> KeyOption {
    KeyOption::Password(password.into())
}

/// Reads the password to decrypt encrypted keys from the file at `path`.
///
/// Trailing whitespace in the file is not part of the password.
pub fn with_password_file(path: impl Into<PathBuf>) -> KeyOption {
    KeyOption::PasswordFile(path.into())
}

/// Asks `prompter` with the message `prompt` for the password to decrypt encrypted keys.
///
/// An empty `prompt` is replaced by a message naming the source of the key.
pub fn with_password_prompter(
    prompt: impl Into<String>,
    prompter: impl PasswordPrompter + 'static,
) -> KeyOption {
    KeyOption::PasswordPrompter {
        prompt: prompt.into(),
        prompter: Arc::new(prompter),
    }
}

/// Overrides the algorithm of the key.
///
/// An empty `algorithm` is ignored.
pub fn with_alg(algorithm: impl Into<String>) -> KeyOption {
    let algorithm = algorithm.into();
    KeyOption::Algorithm((!algorithm.is_empty()).then(|| Algorithm::from(algorithm)))
}

/// Overrides the use ("sig" or "enc") of the key.
///
/// An empty `key_use` is ignored, any other value is validated by [`Context::apply`].
pub fn with_use(key_use: impl Into<String>) -> KeyOption {
    KeyOption::KeyUse(key_use.into())
}

/// Overrides the key ID of the key and selects the key with this ID from a key set.
///
/// An empty `key_id` is ignored.
pub fn with_kid(key_id: impl Into<String>) -> KeyOption {
    let key_id = key_id.into();
    KeyOption::KeyId((!key_id.is_empty()).then_some(key_id))
}

/// Trusts the algorithm override verbatim, even if it does not fit the key.
pub fn with_subtle(subtle: bool) -> KeyOption {
    KeyOption::Subtle(subtle)
}

/// Leaves algorithm and key ID as parsed instead of inferring them.
pub fn with_no_defaults(no_defaults: bool) -> KeyOption {
    KeyOption::NoDefaults(no_defaults)
}

/// Verifies the declared key ID of a private key against its SHA-256 thumbprint.
pub fn with_verify_key_id(verify: bool) -> KeyOption {
    KeyOption::VerifyKeyId(verify)
}

/// Replaces the prompter, that is asked if no password source is configured.
pub fn with_default_prompter(prompter: impl PasswordPrompter + 'static) -> KeyOption {
    KeyOption::DefaultPrompter(Arc::new(prompter))
}

/// Replaces the fetcher used for remote locations.
pub fn with_fetcher(fetcher: impl Fetch + 'static) -> KeyOption {
    KeyOption::Fetcher(Arc::new(fetcher))
}

/// Overrides the label of the source, that is used in log and error messages.
pub fn with_source_label(label: impl Into<String>) -> KeyOption {
    KeyOption::SourceLabel(label.into())
}

/// The configuration of a single resolution
///
/// A [`Context`] is built once from a list of [`KeyOption`]s and is not changed afterwards.
///
/// # Examples
///
/// ```
/// use jose_keys::{Algorithm, Context, with_alg, with_kid, with_use};
///
/// # fn main() -> testresult::TestResult {
/// let context = Context::apply([with_alg("ES256"), with_use("sig"), with_kid("key-1")])?;
/// assert_eq!(context.algorithm(), Some(&Algorithm::Es256));
/// assert_eq!(context.key_id(), Some("key-1"));
///
/// // only one password source can be used
/// assert!(Context::apply([
///     jose_keys::with_password("password"),
///     jose_keys::with_password_file("password.txt"),
/// ])
/// .is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Context {
    password: Option<PasswordSource>,
    algorithm: Option<Algorithm>,
    key_use: Option<KeyUse>,
    key_id: Option<String>,
    subtle: bool,
    no_defaults: bool,
    verify_key_id: bool,
    prompter: Arc<dyn PasswordPrompter>,
    fetcher: Option<Arc<dyn Fetch>>,
    source_label: Option<String>,
}

impl Context {
    /// Creates a [`Context`] from `options`.
    ///
    /// Options are applied in order, later overrides replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - more than one password source is configured,
    /// - a key use other than "sig" or "enc" is configured,
    /// - or more than one fetcher is configured.
    pub fn apply(options: impl IntoIterator<Item = KeyOption>) -> Result<Self, Error> {
        let mut context = Self::default();
        for option in options {
            match option {
                KeyOption::Password(passphrase) => {
                    context.set_password(PasswordSource::Literal(passphrase))?
                }
                KeyOption::PasswordFile(path) => context.set_password(PasswordSource::File(path))?,
                KeyOption::PasswordPrompter { prompt, prompter } => {
                    context.set_password(PasswordSource::Prompter { prompt, prompter })?
                }
                KeyOption::Algorithm(algorithm) => context.algorithm = algorithm,
                KeyOption::KeyUse(value) => {
                    context.key_use = if value.is_empty() {
                        None
                    } else {
                        Some(
                            KeyUse::from_str(&value)
                                .map_err(|_| Error::InvalidKeyUse { value })?,
                        )
                    }
                }
                KeyOption::KeyId(key_id) => context.key_id = key_id,
                KeyOption::Subtle(subtle) => context.subtle = subtle,
                KeyOption::NoDefaults(no_defaults) => context.no_defaults = no_defaults,
                KeyOption::VerifyKeyId(verify) => context.verify_key_id = verify,
                KeyOption::DefaultPrompter(prompter) => context.prompter = prompter,
                KeyOption::Fetcher(fetcher) => {
                    if context.fetcher.is_some() {
                        return Err(Error::ConflictingFetchers);
                    }
                    context.fetcher = Some(fetcher);
                }
                KeyOption::SourceLabel(label) => context.source_label = Some(label),
            }
        }
        Ok(context)
    }

    fn set_password(&mut self, source: PasswordSource) -> Result<(), Error> {
        if let Some(first) = &self.password {
            return Err(Error::ConflictingPasswordSources {
                first: first.name(),
                second: source.name(),
            });
        }
        self.password = Some(source);
        Ok(())
    }

    /// Returns the configured password source.
    pub fn password_source(&self) -> Option<&PasswordSource> {
        self.password.as_ref()
    }

    /// Returns the algorithm override.
    pub fn algorithm(&self) -> Option<&Algorithm> {
        self.algorithm.as_ref()
    }

    /// Returns the key use override.
    pub fn key_use(&self) -> Option<KeyUse> {
        self.key_use
    }

    /// Returns the key ID override.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Returns whether algorithm overrides are trusted without validation.
    pub fn is_subtle(&self) -> bool {
        self.subtle
    }

    /// Returns whether inference of algorithms and key IDs is disabled.
    pub fn no_defaults(&self) -> bool {
        self.no_defaults
    }

    /// Returns whether declared key IDs of private keys are verified.
    pub fn verify_key_id(&self) -> bool {
        self.verify_key_id
    }

    /// Returns the prompter used if no password source is configured.
    pub fn default_prompter(&self) -> &dyn PasswordPrompter {
        self.prompter.as_ref()
    }

    /// Returns the fetcher for remote locations.
    ///
    /// Falls back to a [`HttpsFetcher`] using the native trust store.
    pub fn fetcher(&self) -> Arc<dyn Fetch> {
        match &self.fetcher {
            Some(fetcher) => fetcher.clone(),
            None => Arc::new(HttpsFetcher::default()),
        }
    }

    /// Returns the source label override.
    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            password: None,
            algorithm: None,
            key_use: None,
            key_id: None,
            subtle: false,
            no_defaults: false,
            verify_key_id: false,
            prompter: Arc::new(TerminalPrompter),
            fetcher: None,
            source_label: None,
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("password", &self.password)
            .field("algorithm", &self.algorithm)
            .field("key_use", &self.key_use)
            .field("key_id", &self.key_id)
            .field("subtle", &self.subtle)
            .field("no_defaults", &self.no_defaults)
            .field("verify_key_id", &self.verify_key_id)
            .field("fetcher", &self.fetcher)
            .field("source_label", &self.source_label)
            .finish_non_exhaustive()
    }
}
