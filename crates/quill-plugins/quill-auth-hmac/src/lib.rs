//! # quill-auth-hmac
//!
//! HMAC-SHA256 implementation of `IdentityProvider`. A session token is the
//! base64url-encoded identity id joined to its keyed digest; verification
//! recomputes the digest, so a tampered id or signature resolves to nothing
//! and the caller stays anonymous.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use quill_core::traits::IdentityProvider;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub struct HmacIdentityProvider {
    secret: Vec<u8>,
}

impl HmacIdentityProvider {
    /// Accepts the signing secret (e.g., from an environment variable).
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length")
    }
}

impl IdentityProvider for HmacIdentityProvider {
    fn issue(&self, open_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(open_id.as_bytes());
        let tag = mac.finalize().into_bytes();
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(open_id.as_bytes()),
            URL_SAFE_NO_PAD.encode(tag.as_slice())
        )
    }

    fn verify(&self, token: &str) -> Option<String> {
        let (id_part, tag_part) = token.split_once('.')?;
        let open_id = String::from_utf8(URL_SAFE_NO_PAD.decode(id_part).ok()?).ok()?;
        let tag = URL_SAFE_NO_PAD.decode(tag_part).ok()?;

        let mut mac = self.mac();
        mac.update(open_id.as_bytes());
        // Constant-time comparison via the hmac crate.
        mac.verify_slice(&tag).ok()?;
        Some(open_id)
    }
}
