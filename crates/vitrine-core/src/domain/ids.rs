//! Request identifiers.
//!
//! ULID を使うので、ログ上で生成順に並べられます。
//! 署名付き参照そのものには ID を持たせません（保存しない値なので）。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of one gateway request, attached to its tracing span.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(Ulid);

impl RequestId {
    const PREFIX: &'static str = "req-";

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for RequestId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_prefix() {
        let ulid = Ulid::new();
        let id = RequestId::from_ulid(ulid);
        assert_eq!(id.to_string(), format!("req-{ulid}"));
        assert_eq!(id.as_ulid(), ulid);
    }

    #[test]
    fn request_ids_are_sortable() {
        let id1 = RequestId::from(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RequestId::from(Ulid::new());
        assert!(id1 < id2);
    }

    #[test]
    fn same_size_as_ulid() {
        assert_eq!(std::mem::size_of::<RequestId>(), std::mem::size_of::<Ulid>());
    }
}
