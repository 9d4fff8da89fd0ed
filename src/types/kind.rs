use bytes::Bytes;
use std::fmt;
use std::hash::Hash;

/// Identifies one kind of pooled object; the registry key of a manager.
///
/// Kinds are stored as Bytes which provides:
/// - Reference counting for cheap clones
/// - Zero-copy from caller-owned buffers
/// - Efficient comparison and hashing
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Kind(Bytes);

impl Kind {
    /// Create a new Kind from Bytes
    #[inline]
    pub fn new(data: Bytes) -> Self {
        Self(data)
    }

    /// Create a Kind from a static byte slice (no allocation)
    #[inline]
    pub fn from_static(s: &'static [u8]) -> Self {
        Self(Bytes::from_static(s))
    }

    /// Get the underlying bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length of the kind descriptor
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the kind descriptor is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "Kind({:?})", s),
            Err(_) => write!(f, "Kind({:?})", self.0),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl From<Bytes> for Kind {
    fn from(b: Bytes) -> Self {
        Self(b)
    }
}

impl From<Vec<u8>> for Kind {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        let kind = Kind::from("projectile");
        assert_eq!(kind.as_bytes(), b"projectile");
        assert_eq!(kind.len(), 10);
    }

    #[test]
    fn test_kind_equality() {
        let a = Kind::from("enemy");
        let b = Kind::from("enemy");
        let c = Kind::from("pickup");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_kind_display() {
        let kind = Kind::from("spark");
        assert_eq!(kind.to_string(), "spark");
    }

    #[test]
    fn test_kind_hash_for_hashmap() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Kind::from("a"), 100);
        map.insert(Kind::from("b"), 200);
        assert_eq!(map.get(&Kind::from("a")), Some(&100));
        assert_eq!(map.get(&Kind::from("b")), Some(&200));
    }
}
