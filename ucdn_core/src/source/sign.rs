use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

/// UCloud request signature.
///
/// SHA1 over every `key + value` pair in ascending key order followed by the
/// private key, lowercase hex encoded. `Signature` itself must not be in
/// `params`.
pub fn sign_params(params: &BTreeMap<String, String>, private_key: &str) -> String {
    let mut hasher = Sha1::new();
    for (key, value) in params {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.update(private_key.as_bytes());
    hex::encode(hasher.finalize())
}
