//! Passphrase handling.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use secrecy::{ExposeSecret, SecretBox};

/// A secret passphrase
///
/// The passphrase is held by a [`SecretBox`], which guarantees zeroing of memory on
/// destruct.
/// Passphrases are arbitrary bytes, as they are used as input to key derivation only.
#[derive(Debug)]
pub struct Passphrase(SecretBox<Vec<u8>>);

impl Passphrase {
    /// Creates a new [`Passphrase`] from owned bytes
    ///
    /// # Examples
    /// ```
    /// use jose_crypto::passphrase::Passphrase;
    ///
    /// let passphrase = Passphrase::new(b"passphrase".to_vec());
    /// assert_eq!(passphrase.expose_borrowed(), b"passphrase");
    /// ```
    pub fn new(passphrase: Vec<u8>) -> Self {
        Self(SecretBox::new(Box::new(passphrase)))
    }

    /// Creates a new [`Passphrase`] from the contents of a passphrase file
    ///
    /// Trailing whitespace (e.g. a final newline added by an editor) is not part of the
    /// passphrase and is removed.
    ///
    /// # Examples
    /// ```
    /// use jose_crypto::passphrase::Passphrase;
    ///
    /// let passphrase = Passphrase::from_file_contents(b"passphrase\r\n".to_vec());
    /// assert_eq!(passphrase.expose_borrowed(), b"passphrase");
    /// ```
    pub fn from_file_contents(mut contents: Vec<u8>) -> Self {
        let len = contents
            .iter()
            .rposition(|byte| !byte.is_ascii_whitespace())
            .map_or(0, |position| position + 1);
        contents.truncate(len);
        Self::new(contents)
    }

    /// Exposes the secret passphrase as borrowed bytes
    pub fn expose_borrowed(&self) -> &[u8] {
        self.0.expose_secret()
    }

    /// Returns whether the passphrase is empty.
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl Clone for Passphrase {
    fn clone(&self) -> Self {
        Self::new(self.0.expose_secret().clone())
    }
}

impl Display for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl FromStr for Passphrase {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.as_bytes().to_vec()))
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}
