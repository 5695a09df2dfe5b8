//! UrlSigner - 署名付きメディア参照の発行と検証
//!
//! # 署名方式
//! - message: `"<objectKey>|<exp>"`
//! - HMAC-SHA256（鍵はサーバ側だけが持つ）
//! - base64url（padding なし）
//!
//! 発行はネットワークを使わない純粋関数（key, 現在時刻, 鍵）です。
//! 検証は定数時間比較で行います。

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::builder::BuildError;
use crate::config::SigningSecret;
use crate::domain::reference::signing_message;
use crate::domain::{MediaError, ObjectKey, SignatureFault, SignedReference, Variant, Width};
use crate::ports::Clock;

type HmacSha256 = Hmac<Sha256>;

/// Mints and checks signed media references.
pub struct UrlSigner<C> {
    secret: SigningSecret,
    clock: C,
    default_ttl: Duration,
}

impl<C: Clock> UrlSigner<C> {
    /// Refuses an empty secret: an unverifiable reference must never be minted.
    pub fn new(secret: SigningSecret, clock: C, default_ttl: Duration) -> Result<Self, BuildError> {
        if secret.is_empty() {
            return Err(BuildError::MissingSecret);
        }
        Ok(Self {
            secret,
            clock,
            default_ttl,
        })
    }

    fn mac(&self, key: &ObjectKey, expiry: i64) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(signing_message(key, expiry).as_bytes());
        mac
    }

    /// Mint a reference valid for `ttl` (or the default lifetime) from now.
    pub fn sign(&self, key: &ObjectKey, ttl: Option<Duration>) -> SignedReference {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expiry = self.clock.now_secs().saturating_add(ttl_secs);

        let signature = URL_SAFE_NO_PAD.encode(self.mac(key, expiry).finalize().into_bytes());
        SignedReference::new(key.clone(), expiry, signature)
    }

    /// `/media/<key>?exp=..&sig=..` for embedding in an image tag.
    pub fn signed_path(&self, key: &ObjectKey, ttl: Option<Duration>) -> String {
        self.sign(key, ttl).path_and_query()
    }

    /// A `srcset` value covering every derivative width of one variant.
    pub fn srcset(
        &self,
        collection: &str,
        variant: Variant,
        ttl: Option<Duration>,
    ) -> Result<String, MediaError> {
        let entries = Width::ALL
            .into_iter()
            .map(|width| {
                let key = ObjectKey::derivative(collection, variant, width)?;
                Ok(format!("{} {}w", self.signed_path(&key, ttl), width))
            })
            .collect::<Result<Vec<String>, MediaError>>()?;
        Ok(entries.join(", "))
    }

    /// Check the `exp` / `sig` query values of a request for `key`.
    ///
    /// `exp` is exclusive: a reference expiring now is already invalid,
    /// unless `leeway` extends it. Only the form `sign` emits is accepted
    /// (`+N`, `0N` or padded values would mint new cache keys for one reference).
    pub fn verify(
        &self,
        key: &ObjectKey,
        exp: Option<&str>,
        sig: Option<&str>,
        leeway: Duration,
    ) -> Result<(), SignatureFault> {
        let (Some(exp), Some(sig)) = (exp, sig) else {
            return Err(SignatureFault::MissingParams);
        };
        if sig.is_empty() {
            return Err(SignatureFault::MissingParams);
        }

        let expiry: i64 = exp.parse().map_err(|_| SignatureFault::MalformedExpiry)?;
        if expiry.to_string() != exp {
            return Err(SignatureFault::MalformedExpiry);
        }
        let leeway = i64::try_from(leeway.as_secs()).unwrap_or(i64::MAX);
        if expiry.saturating_add(leeway) <= self.clock.now_secs() {
            return Err(SignatureFault::Expired);
        }

        let provided = URL_SAFE_NO_PAD
            .decode(sig.as_bytes())
            .map_err(|_| SignatureFault::Mismatch)?;

        // verify_slice は定数時間で比較する
        self.mac(key, expiry)
            .verify_slice(&provided)
            .map_err(|_| SignatureFault::Mismatch)
    }
}
