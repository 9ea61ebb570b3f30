//! # lp-auth-simple
//!
//! HMAC-signed bearer tokens implementing `IdentityProvider`. The token is
//! `<owner_id>.<signature>`; whoever holds a token with a valid signature
//! acts as that owner. Login/registration flows live with the identity
//! provider in front of this service, not here.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use lp_core::traits::IdentityProvider;

type HmacSha256 = Hmac<Sha256>;

pub struct SimpleIdentityProvider {
    secret: Vec<u8>,
}

impl SimpleIdentityProvider {
    /// Accepts the signing secret (e.g. from an environment variable).
    pub fn new(secret: &str) -> Self {
        Self { secret: secret.as_bytes().to_vec() }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any size")
    }

    fn signature(&self, owner_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(owner_id.as_bytes());
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

impl IdentityProvider for SimpleIdentityProvider {
    fn issue_token(&self, owner_id: &str) -> String {
        format!("{}.{}", owner_id, self.signature(owner_id))
    }

    /// Signature check is constant-time via the Mac verifier.
    fn owner_for_token(&self, token: &str) -> Option<String> {
        let (owner_id, signature) = token.rsplit_once('.')?;
        if owner_id.is_empty() {
            return None;
        }
        let presented = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .ok()?;
        let mut mac = self.mac();
        mac.update(owner_id.as_bytes());
        mac.verify_slice(&presented).ok()?;
        Some(owner_id.to_string())
    }
}
