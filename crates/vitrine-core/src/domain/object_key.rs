//! ObjectKey - 派生画像（derivative）のオブジェクトキー
//!
//! 公開してよいのは透かし入りの派生画像だけです。原本（master）や
//! 想定外のパスに到達できないよう、キーは allow-list で厳密に検証します。
//!
//! # 形式
//! `<collection>/<variant>_<width>_wm.<ext>`
//! - collection: `[a-z0-9-]+`
//! - variant: `full` | `interior`
//! - width: `1600` | `1200` | `800` | `480`
//! - ext: `webp`
//!
//! 大文字小文字は区別しません（ASCII のみ）。パース後のキーは入力どおりの
//! 表記を保持し、そのまま署名対象・リダイレクト先に使われます。

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::errors::MediaError;

/// Derivative image variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// The artwork itself.
    Full,
    /// The artwork photographed in an interior.
    Interior,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Full, Variant::Interior];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Full => "full",
            Variant::Interior => "interior",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or(MediaError::InvalidPath)
    }
}

/// Derivative width in pixels (longest side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    W1600,
    W1200,
    W800,
    W480,
}

impl Width {
    /// Widest first, the order the derivative pipeline produces them in.
    pub const ALL: [Width; 4] = [Width::W1600, Width::W1200, Width::W800, Width::W480];

    pub fn pixels(self) -> u32 {
        match self {
            Width::W1600 => 1600,
            Width::W1200 => 1200,
            Width::W800 => 800,
            Width::W480 => 480,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

impl FromStr for Width {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "01200" や "+800" を通さないよう、数値変換ではなく文字列で比較する
        Width::ALL
            .into_iter()
            .find(|w| w.pixels().to_string() == s)
            .ok_or(MediaError::InvalidPath)
    }
}

/// Only derivative format produced.
const EXTENSION: &str = "webp";

/// Watermark marker between the width and the extension.
const WATERMARK_SUFFIX: &str = "_wm";

/// A validated object key of one derivative image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ObjectKey {
    raw: String,
    variant: Variant,
    width: Width,
}

impl ObjectKey {
    /// Parse and validate a key against the allow-list.
    pub fn parse(raw: &str) -> Result<Self, MediaError> {
        let (collection, file) = raw.split_once('/').ok_or(MediaError::InvalidPath)?;
        if !is_collection(collection) {
            return Err(MediaError::InvalidPath);
        }

        // "<variant>_<width>_wm.<ext>"
        let (stem, ext) = file.rsplit_once('.').ok_or(MediaError::InvalidPath)?;
        if !ext.eq_ignore_ascii_case(EXTENSION) {
            return Err(MediaError::InvalidPath);
        }
        let stem = strip_suffix_ignore_case(stem, WATERMARK_SUFFIX).ok_or(MediaError::InvalidPath)?;
        let (variant, width) = stem.split_once('_').ok_or(MediaError::InvalidPath)?;

        Ok(Self {
            raw: raw.to_string(),
            variant: variant.parse()?,
            width: width.parse()?,
        })
    }

    /// Build the canonical (lower-case) key of one derivative.
    pub fn derivative(collection: &str, variant: Variant, width: Width) -> Result<Self, MediaError> {
        let collection = collection.to_ascii_lowercase();
        Self::parse(&format!(
            "{collection}/{variant}_{width}{WATERMARK_SUFFIX}.{EXTENSION}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn collection(&self) -> &str {
        // parse() guarantees exactly one '/'
        self.raw.split('/').next().unwrap_or_default()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn width(&self) -> Width {
        self.width
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ObjectKey {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.raw
    }
}

fn is_collection(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("deja-vu/full_1200_wm.webp", Variant::Full, Width::W1200)]
    #[case("released/interior_1200_wm.webp", Variant::Interior, Width::W1200)]
    #[case("a1/full_480_wm.webp", Variant::Full, Width::W480)]
    #[case("Deja-Vu/FULL_1600_WM.WEBP", Variant::Full, Width::W1600)]
    fn accepts_allow_listed_keys(#[case] raw: &str, #[case] variant: Variant, #[case] width: Width) {
        let key = ObjectKey::parse(raw).unwrap();
        assert_eq!(key.as_str(), raw);
        assert_eq!(key.variant(), variant);
        assert_eq!(key.width(), width);
    }

    #[rstest]
    #[case("../deja-vu/full_1200_wm.webp")]
    #[case("deja-vu/../full_1200_wm.webp")]
    #[case("deja-vu/..%2Ffull_1200_wm.webp")]
    #[case("/deja-vu/full_1200_wm.webp")]
    #[case("deja-vu/sub/full_1200_wm.webp")]
    #[case("deja-vu\\full_1200_wm.webp")]
    #[case("deja-vu/detail_1200_wm.webp")]
    #[case("deja-vu/full_1000_wm.webp")]
    #[case("deja-vu/full_01200_wm.webp")]
    #[case("deja-vu/full_1200.webp")]
    #[case("deja-vu/full_1200_wm.png")]
    #[case("deja-vu/full.jpg")]
    #[case("deja_vu/full_1200_wm.webp")]
    #[case("/full_1200_wm.webp")]
    #[case("deja-vu/")]
    #[case("")]
    fn rejects_everything_else(#[case] raw: &str) {
        assert!(matches!(ObjectKey::parse(raw), Err(MediaError::InvalidPath)));
    }

    #[test]
    fn derivative_builds_canonical_key() {
        let key = ObjectKey::derivative("Deja-Vu", Variant::Interior, Width::W800).unwrap();
        assert_eq!(key.as_str(), "deja-vu/interior_800_wm.webp");
        assert_eq!(key.collection(), "deja-vu");
    }

    #[test]
    fn derivative_rejects_bad_collection() {
        assert!(ObjectKey::derivative("../etc", Variant::Full, Width::W480).is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = ObjectKey::parse("deja-vu/full_1200_wm.webp").unwrap();
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            "\"deja-vu/full_1200_wm.webp\""
        );
    }
}
