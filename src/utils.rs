/// [Cantor pairing function][cantor-pairing], with the first argument as the tie-breaker.
///
/// ```text
/// (a, b) -> (a + b) * (a + b + 1) / 2 + a
/// ```
///
/// Arithmetic wraps, so the result is only a hash for large inputs.
///
/// [cantor-pairing]: https://en.wikipedia.org/wiki/Pairing_function#Cantor_pairing_function
pub fn pairing_cantor(a: u64, b: u64) -> u64 {
    let s = a.wrapping_add(b);
    (s.wrapping_mul(s.wrapping_add(1)) / 2).wrapping_add(a)
}

/// Hash of a node record: the pairing function folded over the variable and then each child.
pub fn hash_node(variable: u32, children: &[u32]) -> u64 {
    children
        .iter()
        .fold(variable as u64, |hash, &child| pairing_cantor(child as u64, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_cantor() {
        // a\b  0  1  2  3  4
        // ------------------
        // 0    0  1  3  6 10
        // 1    2  4  7 11
        // 2    5  8 12
        // 3    9 13
        // 4   14          40
        assert_eq!(pairing_cantor(0, 0), 0);
        assert_eq!(pairing_cantor(0, 1), 1);
        assert_eq!(pairing_cantor(1, 0), 2);
        assert_eq!(pairing_cantor(0, 2), 3);
        assert_eq!(pairing_cantor(1, 1), 4);
        assert_eq!(pairing_cantor(2, 0), 5);
        assert_eq!(pairing_cantor(0, 4), 10);
        assert_eq!(pairing_cantor(4, 0), 14);
        assert_eq!(pairing_cantor(4, 4), 40);
    }

    #[test]
    fn test_cantor_wraps() {
        // Must not overflow-panic in debug builds.
        let _ = pairing_cantor(u64::MAX, u64::MAX);
        let _ = pairing_cantor(u64::MAX / 2, 17);
    }

    #[test]
    fn test_hash_node() {
        assert_eq!(hash_node(3, &[]), 3);
        assert_eq!(hash_node(0, &[1]), pairing_cantor(1, 0));
        assert_eq!(hash_node(2, &[0, 1]), pairing_cantor(1, pairing_cantor(0, 2)));
        assert_ne!(hash_node(2, &[0, 1]), hash_node(2, &[1, 0]));
    }
}
