//! GitHub webhook signature validation.
//!
//! GitHub signs each delivery with the shared webhook secret and sends the
//! digest as `x-hub-signature: sha1=<hex>` and, on newer installations, also
//! as `x-hub-signature-256: sha256=<hex>`. Verification never fails loudly:
//! anything that is not a matching signature is simply `false`.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Header carrying the HMAC-SHA1 digest.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";
/// Header carrying the HMAC-SHA256 digest.
pub const SIGNATURE_256_HEADER: &str = "x-hub-signature-256";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1=",
            Self::Sha256 => "sha256=",
        }
    }
}

/// Validate a webhook signature header against the raw body.
///
/// Returns `false` when the secret is empty, the header is absent or
/// malformed, or the digest does not match. The digest comparison is
/// constant-time (`Mac::verify_slice`).
pub fn verify_signature(
    algorithm: SignatureAlgorithm,
    secret: &str,
    payload: &[u8],
    signature: Option<&str>,
) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(header) = signature else {
        return false;
    };
    let Some(hex_sig) = header.trim().strip_prefix(algorithm.prefix()) else {
        return false;
    };
    let Ok(sig_bytes) = hex::decode(hex_sig) else {
        return false;
    };

    match algorithm {
        SignatureAlgorithm::Sha1 => match HmacSha1::new_from_slice(secret.as_bytes()) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.verify_slice(&sig_bytes).is_ok()
            }
            Err(_) => false,
        },
        SignatureAlgorithm::Sha256 => match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.verify_slice(&sig_bytes).is_ok()
            }
            Err(_) => false,
        },
    }
}

/// Produce the header value GitHub would send for `payload`.
#[cfg(test)]
pub(crate) fn sign(algorithm: SignatureAlgorithm, secret: &str, payload: &[u8]) -> String {
    let digest = match algorithm {
        SignatureAlgorithm::Sha1 => {
            let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).unwrap();
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
        SignatureAlgorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
    };
    format!("{}{}", algorithm.prefix(), hex::encode(digest))
}
