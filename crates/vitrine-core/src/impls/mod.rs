//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **SlidingWindowLimiter**: in-process の rate limiter
//! - **PublicBucketStore**: 公開バケットへの URL 導出

pub mod public_bucket;
pub mod sliding_window;

pub use self::public_bucket::PublicBucketStore;
pub use self::sliding_window::SlidingWindowLimiter;
