//! Domain model (object keys, signed references, limiter decisions, errors).
//!
//! I/O を持たない純粋な型だけを置きます。

pub mod decision;
pub mod errors;
pub mod ids;
pub mod object_key;
pub mod reference;

pub use self::decision::{RateDecision, retry_after_secs};
pub use self::errors::{ErrorKind, MediaError, SignatureFault};
pub use self::ids::RequestId;
pub use self::object_key::{ObjectKey, Variant, Width};
pub use self::reference::{MEDIA_ROUTE_PREFIX, SignedReference};
