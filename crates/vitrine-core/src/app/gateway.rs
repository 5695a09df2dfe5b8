//! MediaGateway - 署名付き参照の検証とリダイレクト
//!
//! # リクエストの流れ
//! 1. Parse: object key を allow-list で検証（署名の計算より先）
//! 2. Verify: `exp` / `sig` を定数時間で照合
//! 3. Rate-limit: IP と key の 2 つの窓を並行に消費
//! 4. Redirect: 公開配信 URL へ 308
//!
//! # 設計原則
//! - リクエスト間で共有する状態は limiter だけ
//! - limiter が答えない・失敗したときは拒否する（fail closed）
//! - 拒否理由はログにだけ残し、クライアントには汎用メッセージを返す

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{MediaError, ObjectKey, RateDecision, RequestId, retry_after_secs};
use crate::ports::{Clock, IdGenerator, LimiterError, MediaStore, RateLimiter};

use super::signer::UrlSigner;

/// One inbound media request, as extracted from HTTP.
#[derive(Debug, Clone, Copy)]
pub struct GatewayRequest<'a> {
    /// Object key (the path after `/media/`).
    pub path: &'a str,
    pub exp: Option<&'a str>,
    pub sig: Option<&'a str>,
    pub client_ip: &'a str,
}

/// An accepted request: where to send the client and for how long to cache it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub cache_control: String,
}

/// MediaGateway は per-request の状態機械
///
/// Built by [`GatewayBuilder`](super::builder::GatewayBuilder).
pub struct MediaGateway {
    pub(crate) signer: UrlSigner<Arc<dyn Clock>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) ip_limiter: Arc<dyn RateLimiter>,
    pub(crate) key_limiter: Arc<dyn RateLimiter>,
    pub(crate) store: Arc<dyn MediaStore>,
    pub(crate) clock_skew: Duration,
    pub(crate) redirect_ttl: Duration,
    pub(crate) limiter_timeout: Duration,
}

impl MediaGateway {
    /// The signer sharing this gateway's secret and clock.
    pub fn signer(&self) -> &UrlSigner<Arc<dyn Clock>> {
        &self.signer
    }

    pub fn next_request_id(&self) -> RequestId {
        self.ids.generate_request_id()
    }

    /// Run one request through parse, verify, rate-limit and redirect.
    pub async fn handle(&self, req: GatewayRequest<'_>) -> Result<Redirect, MediaError> {
        let key = ObjectKey::parse(req.path).inspect_err(|_| {
            debug!(target: "gateway", path = req.path, "rejected: path not allow-listed");
        })?;

        self.signer
            .verify(&key, req.exp, req.sig, self.clock_skew)
            .inspect_err(|fault| {
                debug!(target: "gateway", key = %key, %fault, "rejected: signature");
            })?;

        let ip_key = format!("ip:{}", req.client_ip);
        let object_key = format!("key:{key}");
        let (by_ip, by_key) = tokio::join!(
            self.bounded(self.ip_limiter.limit(&ip_key)),
            self.bounded(self.key_limiter.limit(&object_key)),
        );
        let decisions = [by_ip.map_err(unavailable)?, by_key.map_err(unavailable)?];

        if decisions.iter().any(|d| !d.success) {
            let retry_after_secs = retry_after_secs(&decisions, self.clock.now_millis());
            debug!(
                target: "gateway",
                key = %key,
                client_ip = req.client_ip,
                ip_ok = decisions[0].success,
                key_ok = decisions[1].success,
                retry_after_secs,
                "rejected: rate limited"
            );
            return Err(MediaError::RateLimited { retry_after_secs });
        }

        let location = self.store.public_url(&key);
        debug!(target: "gateway", key = %key, %location, "redirect");
        Ok(Redirect {
            location,
            cache_control: self.cache_control(),
        })
    }

    fn cache_control(&self) -> String {
        let ttl = self.redirect_ttl.as_secs();
        format!("public, max-age={ttl}, s-maxage={ttl}, immutable")
    }

    async fn bounded<F>(&self, call: F) -> Result<RateDecision, LimiterError>
    where
        F: Future<Output = Result<RateDecision, LimiterError>>,
    {
        match tokio::time::timeout(self.limiter_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LimiterError::Timeout(self.limiter_timeout.as_millis() as u64)),
        }
    }
}

fn unavailable(err: LimiterError) -> MediaError {
    warn!(target: "gateway", error = %err, "rate limiter failed; rejecting request");
    MediaError::LimiterUnavailable(err.to_string())
}
