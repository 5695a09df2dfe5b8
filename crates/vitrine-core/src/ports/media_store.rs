//! MediaStore port - 派生画像の公開配信先
//!
//! Gateway はバイト列を中継せず、ストレージ側 CDN の公開 URL へ
//! リダイレクトするだけなので、必要なのは URL の導出だけです。

use crate::domain::ObjectKey;

/// MediaStore は object key ごとに安定した公開 URL を返す
pub trait MediaStore: Send + Sync {
    fn public_url(&self, key: &ObjectKey) -> String;
}
