//! vitrine-core
//!
//! Signed media references and the gateway that serves them.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（object_key, reference, decision, ids, errors）
//! - **ports**: 抽象化レイヤー（Clock, RateLimiter, MediaStore, IdGenerator）
//! - **app**: アプリケーションロジック（builder, signer, gateway, http）
//! - **impls**: 実装（SlidingWindowLimiter, PublicBucketStore）
//! - **config**: 環境変数からの設定
//! - **observability**: tracing subscriber の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
