//! Name hashing
//!
//! Functions, methods, namespaces and slots are addressed by a stable
//! 32-bit hash of their name (djb2, case-sensitive). The empty name hashes
//! to 0, which is also the global namespace.

/// Hash of the global namespace (free functions)
pub const GLOBAL_NAMESPACE: u32 = 0;

/// Hash a name into its stable integer key.
pub const fn hash(name: &str) -> u32 {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return 0;
    }

    let mut h: u32 = 5381;
    let mut i = 0;
    while i < bytes.len() {
        h = (h << 5).wrapping_add(h).wrapping_add(bytes[i] as u32);
        i += 1;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_global() {
        assert_eq!(hash(""), GLOBAL_NAMESPACE);
    }

    #[test]
    fn test_known_values() {
        // djb2("a") = 5381 * 33 + 97
        assert_eq!(hash("a"), 177_670);
        assert_eq!(hash("Add"), hash("Add"));
    }

    #[test]
    fn test_case_sensitive() {
        assert_ne!(hash("Add"), hash("add"));
    }

    #[test]
    fn test_usable_in_const() {
        const RETURN: u32 = hash("__return");
        assert_eq!(RETURN, hash("__return"));
    }
}
