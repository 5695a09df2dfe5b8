//! PublicBucketStore - 公開バケットの配信 URL
//!
//! 例: base = `https://<project>.supabase.co/storage/v1/object/public/artworks-derivatives`
//! → `<base>/deja-vu/full_1200_wm.webp`

use crate::domain::ObjectKey;
use crate::ports::MediaStore;

/// Maps object keys onto a public delivery base URL.
#[derive(Debug, Clone)]
pub struct PublicBucketStore {
    base_url: String,
}

impl PublicBucketStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl MediaStore for PublicBucketStore {
    fn public_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
