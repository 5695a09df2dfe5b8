//! Ports - 抽象化レイヤー
//!
//! 外部の協調者（時刻、rate limit のカウンタ置き場、オブジェクトストレージ）
//! へのインターフェースを定義し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - Gateway 自身はリクエストを跨ぐ可変状態を持たない
//! - 共有状態は limiter の背後にだけ存在する

pub mod clock;
pub mod id_generator;
pub mod media_store;
pub mod rate_limiter;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::media_store::MediaStore;
pub use self::rate_limiter::{LimiterError, RateLimiter};
