//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて署名付きメディア参照の発行と検証を実装します。
//!
//! # 主要コンポーネント
//! - **GatewayBuilder**: Gateway の構築とワイヤリング
//! - **UrlSigner**: 署名付き参照の発行と検証
//! - **MediaGateway**: parse → verify → rate-limit → redirect
//! - **router**: axum の HTTP 表面

pub mod builder;
pub mod client_ip;
pub mod gateway;
pub mod http;
pub mod signer;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, GatewayBuilder};
pub use self::client_ip::{UNKNOWN_CLIENT, client_ip};
pub use self::gateway::{GatewayRequest, MediaGateway, Redirect};
pub use self::http::router;
pub use self::signer::UrlSigner;
