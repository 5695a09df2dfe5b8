//! RateLimiter port - sliding window limiter
//!
//! カウンタの保持と「加算してから判定」の原子性は実装側の責務です。
//! Gateway は `success` と `reset_ms` しか読みません。
//!
//! # 実装
//! - **SlidingWindowLimiter**: in-process（Mutex で保護）
//! - 外部 KV ベースのサービスも同じ契約で差し込める

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RateDecision;

#[derive(Debug, Error)]
pub enum LimiterError {
    #[error("limiter backend unavailable: {0}")]
    Unavailable(String),

    #[error("limiter did not answer within {0} ms")]
    Timeout(u64),
}

/// RateLimiter は 1 ヒットを記録し、その可否を返す
///
/// # 契約
/// - 1 回の呼び出し = 1 ヒット
/// - 同一 key に対する increment-and-check は原子的
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn limit(&self, key: &str) -> Result<RateDecision, LimiterError>;
}
