//! Errors - エラー型と分類
//!
//! Gateway の失敗はすべてリクエスト単位で終端します（サーバ側でのリトライなし）。
//! 回復はクライアントが新しい署名付き参照を取り直すことで行います。

use thiserror::Error;

/// ErrorKind は失敗の運用上の分類
///
/// HTTP ステータスへの対応は `app::http` が持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or disallowed request.
    Client,
    /// Missing, expired or forged signature.
    Auth,
    /// Quota exhausted.
    Throttled,
    /// A collaborator (limiter backend) failed; the request is rejected.
    Infrastructure,
}

/// Why a signed reference was refused.
///
/// Only logged; clients always see a generic "Forbidden".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureFault {
    #[error("exp or sig query parameter is missing")]
    MissingParams,

    #[error("exp is not a canonical unix timestamp")]
    MalformedExpiry,

    #[error("reference has expired")]
    Expired,

    #[error("signature does not match")]
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("invalid path")]
    InvalidPath,

    #[error("signature rejected: {0}")]
    SignatureInvalid(#[from] SignatureFault),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("rate limiter unavailable: {0}")]
    LimiterUnavailable(String),
}

impl MediaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::InvalidPath => ErrorKind::Client,
            MediaError::SignatureInvalid(_) => ErrorKind::Auth,
            MediaError::RateLimited { .. } => ErrorKind::Throttled,
            MediaError::LimiterUnavailable(_) => ErrorKind::Infrastructure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_faults_convert_into_media_error() {
        let err: MediaError = SignatureFault::Expired.into();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn kinds_cover_every_variant() {
        assert_eq!(MediaError::InvalidPath.kind(), ErrorKind::Client);
        assert_eq!(
            MediaError::RateLimited { retry_after_secs: 3 }.kind(),
            ErrorKind::Throttled
        );
        assert_eq!(
            MediaError::LimiterUnavailable("timeout".into()).kind(),
            ErrorKind::Infrastructure
        );
    }
}
