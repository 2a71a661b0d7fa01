//! Selection of a key from a key set.

use log::debug;

use crate::{
    Error,
    jwk::{JsonWebKey, JsonWebKeySet},
    normalize::normalize,
    options::Context,
};

/// Selects the key with the key ID `kid` from `set`.
///
/// Only entries declaring `kid` are parsed, so that unsupported keys with other IDs do not
/// prevent the selection. The selected key is completed using `context`.
///
/// # Errors
///
/// Returns an error naming `kid` and `location` if
///
/// - no key with `kid` exists ([`Error::NotFound`]),
/// - more than one key with `kid` exists ([`Error::AmbiguousKey`]),
/// - or the selected key is invalid.
pub(crate) fn select_key(
    set: &JsonWebKeySet,
    kid: &str,
    context: &Context,
    location: &str,
) -> Result<JsonWebKey, Error> {
    let entries = set.entries_with_id(kid);
    let entry = match entries.as_slice() {
        [] => {
            return Err(Error::NotFound {
                kid: kid.to_string(),
                location: location.to_string(),
            });
        }
        [entry] => *entry,
        _ => {
            return Err(Error::AmbiguousKey {
                kid: kid.to_string(),
                location: location.to_string(),
            });
        }
    };
    debug!("Selected key {kid} from {} keys of {location}", set.len());

    let key = JsonWebKey::from_value(entry).map_err(|error| Error::jwk(location, error))?;
    normalize(key, context, location)
}
