use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reference-counted string for file paths and function names. Every node of
/// a profile that shares a frame shares its strings; a clone is a refcount
/// bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedStr(Arc<str>);

impl SharedStr {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component. Both `/` and `\` separate components.
    pub fn basename(&self) -> &str {
        match self.0.rfind(['/', '\\']) {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }
}

impl Deref for SharedStr {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SharedStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SharedStr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SharedStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl From<&str> for SharedStr {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for SharedStr {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for SharedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SharedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct SharedStrVisitor;

impl Visitor<'_> for SharedStrVisitor {
    type Value = SharedStr;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SharedStr, E> {
        Ok(SharedStr::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<SharedStr, E> {
        Ok(SharedStr::from(v))
    }
}

impl<'de> Deserialize<'de> for SharedStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_string(SharedStrVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_allocation() {
        let a = SharedStr::from("src/main.rs");
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_eq!(a, b);
    }

    #[test]
    fn basename_handles_both_separators() {
        assert_eq!(SharedStr::from("/usr/lib/python3/json/decoder.py").basename(), "decoder.py");
        assert_eq!(SharedStr::from(r"C:\work\app\main.py").basename(), "main.py");
        assert_eq!(SharedStr::from("main.py").basename(), "main.py");
        assert_eq!(SharedStr::from("dir/").basename(), "");
    }

    #[test]
    fn json_strings_with_escapes() {
        let s: SharedStr = serde_json::from_str(r#""C:\\src\\lib.rs""#).unwrap();
        assert_eq!(s, r"C:\src\lib.rs");
        assert_eq!(serde_json::to_string(&s).unwrap(), r#""C:\\src\\lib.rs""#);
    }
}
