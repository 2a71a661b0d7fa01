#![doc = include_str!("../README.md")]

pub mod algorithm;
pub mod classify;
mod error;
pub mod fetch;
pub mod jwe;
pub mod jwk;
mod keyset;
mod normalize;
pub mod options;
pub mod password;
pub mod prompt;
mod resolve;
pub mod source;
pub mod tls;
pub mod validate;

pub use algorithm::{Algorithm, KeyUse, infer_algorithm, signature_algorithm};
pub use error::Error;
pub use fetch::{Fetch, HttpsFetcher};
pub use jwe::{EncryptOptions, encrypt_key, encrypt_key_set};
pub use jwk::{JsonWebKey, JsonWebKeySet};
pub use options::{
    Context,
    KeyOption,
    with_alg,
    with_default_prompter,
    with_fetcher,
    with_kid,
    with_no_defaults,
    with_password,
    with_password_file,
    with_password_prompter,
    with_source_label,
    with_subtle,
    with_use,
    with_verify_key_id,
};
pub use password::PasswordSource;
pub use prompt::{PasswordPrompter, TerminalPrompter};
pub use resolve::{resolve_key, resolve_key_set};
pub use source::{KeySource, Url};
pub use tls::ConnectionSecurity;
pub use validate::{validate_key, validate_key_id};
