//! SignedReference - 署名付き・期限付きのメディア参照
//!
//! # 設計原則
//! - 保存しない（必要なときに導出する）
//! - 一度発行したら不変
//! - 寿命は埋め込まれた `exp` だけで決まる

use serde::Serialize;

use super::object_key::ObjectKey;

/// Route prefix the gateway is mounted under.
pub const MEDIA_ROUTE_PREFIX: &str = "/media/";

/// A minted, URL-embeddable reference to one derivative image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedReference {
    key: ObjectKey,
    /// Unix seconds; the reference is invalid from this instant on.
    expiry: i64,
    /// base64url (no padding) HMAC-SHA256 over `"<key>|<expiry>"`.
    signature: String,
}

impl SignedReference {
    pub(crate) fn new(key: ObjectKey, expiry: i64, signature: String) -> Self {
        Self {
            key,
            expiry,
            signature,
        }
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn expiry(&self) -> i64 {
        self.expiry
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `/media/<key>?exp=<expiry>&sig=<signature>`
    ///
    /// base64url never needs escaping inside a query string.
    pub fn path_and_query(&self) -> String {
        format!(
            "{MEDIA_ROUTE_PREFIX}{}?exp={}&sig={}",
            self.key, self.expiry, self.signature
        )
    }
}

/// The message a signature covers.
pub(crate) fn signing_message(key: &ObjectKey, expiry: i64) -> String {
    format!("{key}|{expiry}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_path_and_query() {
        let key = ObjectKey::parse("deja-vu/full_1200_wm.webp").unwrap();
        let reference = SignedReference::new(key, 1_700_000_060, "abc-_".to_string());
        assert_eq!(
            reference.path_and_query(),
            "/media/deja-vu/full_1200_wm.webp?exp=1700000060&sig=abc-_"
        );
    }

    #[test]
    fn message_joins_key_and_expiry_with_pipe() {
        let key = ObjectKey::parse("deja-vu/full_1200_wm.webp").unwrap();
        assert_eq!(
            signing_message(&key, 42),
            "deja-vu/full_1200_wm.webp|42"
        );
    }
}
