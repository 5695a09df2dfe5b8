//! GatewayBuilder - Gateway の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 署名鍵が空なら build() で失敗する（検証不能な参照を発行・受理しない）
//! - 公開 URL の基点がなく、MediaStore も渡されていなければ失敗する
//! - 明示されなかった port は Config から in-process 実装で埋める

use std::sync::Arc;

use crate::config::Config;
use crate::impls::{PublicBucketStore, SlidingWindowLimiter};
use crate::ports::{Clock, IdGenerator, MediaStore, RateLimiter, SystemClock, UlidGenerator};

use super::gateway::MediaGateway;
use super::signer::UrlSigner;

/// BuildError は起動時のワイヤリングエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("MEDIA_TOKEN_SECRET is empty; refusing to sign or verify media references")]
    MissingSecret,

    #[error("no media store configured and MEDIA_PUBLIC_BASE_URL is not set")]
    MissingPublicBaseUrl,
}

/// GatewayBuilder は MediaGateway を構築
///
/// # 使用例
/// ```ignore
/// let gateway = GatewayBuilder::new(Config::from_env()?)
///     .ip_limiter(Arc::new(my_remote_limiter))
///     .build()?;
/// ```
pub struct GatewayBuilder {
    config: Config,
    clock: Arc<dyn Clock>,
    ip_limiter: Option<Arc<dyn RateLimiter>>,
    key_limiter: Option<Arc<dyn RateLimiter>>,
    store: Option<Arc<dyn MediaStore>>,
}

impl GatewayBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            ip_limiter: None,
            key_limiter: None,
            store: None,
        }
    }

    /// Time source for the signer, the default limiters and request ids.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn ip_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.ip_limiter = Some(limiter);
        self
    }

    pub fn key_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.key_limiter = Some(limiter);
        self
    }

    pub fn store(mut self, store: Arc<dyn MediaStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<MediaGateway, BuildError> {
        let Self {
            config,
            clock,
            ip_limiter,
            key_limiter,
            store,
        } = self;

        let signer = UrlSigner::new(config.media.secret.clone(), clock.clone(), config.media.sign_ttl)?;

        let store: Arc<dyn MediaStore> = match (store, &config.media.public_base_url) {
            (Some(store), _) => store,
            (None, Some(base)) => Arc::new(PublicBucketStore::new(base.clone())),
            (None, None) => return Err(BuildError::MissingPublicBaseUrl),
        };

        let limits = &config.rate_limit;
        let ip_limiter: Arc<dyn RateLimiter> = match ip_limiter {
            Some(limiter) => limiter,
            None => Arc::new(SlidingWindowLimiter::new(limits.ip_max, limits.window, clock.clone())),
        };
        let key_limiter: Arc<dyn RateLimiter> = match key_limiter {
            Some(limiter) => limiter,
            None => Arc::new(SlidingWindowLimiter::new(limits.key_max, limits.window, clock.clone())),
        };

        let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(clock.clone()));

        Ok(MediaGateway {
            signer,
            clock,
            ids,
            ip_limiter,
            key_limiter,
            store,
            clock_skew: config.media.clock_skew,
            redirect_ttl: config.media.redirect_ttl,
            limiter_timeout: config.rate_limit.timeout,
        })
    }
}
