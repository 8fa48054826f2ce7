use super::BooleanBackend;

/// Native boolean logic. Free to construct.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainBackend;

impl PlainBackend {
    pub fn new() -> PlainBackend {
        PlainBackend
    }
}

impl BooleanBackend for PlainBackend {
    type Bit = bool;

    fn name(&self) -> &'static str {
        "plaintext"
    }

    fn zero(&self) -> bool {
        false
    }

    fn not(&self, a: &bool) -> bool {
        !*a
    }

    fn and(&self, a: &bool, b: &bool) -> bool {
        *a && *b
    }

    fn copy(&self, a: &bool) -> bool {
        *a
    }

    fn encode(&self, value: bool) -> bool {
        value
    }

    fn decode(&self, a: &bool) -> bool {
        *a
    }
}

#[cfg(test)]
mod tests {
    use itertools::iproduct;

    use super::*;

    #[test]
    fn truth_tables() {
        let backend = PlainBackend::new();
        assert!(!backend.zero());
        assert!(backend.one());

        for a in [false, true] {
            assert_eq!(backend.not(&a), !a);
            assert_eq!(backend.copy(&a), a);
            assert_eq!(backend.decode(&backend.encode(a)), a);
        }
        for (a, b) in iproduct!([false, true], [false, true]) {
            assert_eq!(backend.and(&a, &b), a & b);
        }
    }

    #[test]
    fn and_is_commutative() {
        let backend = PlainBackend::new();
        for (a, b) in iproduct!([false, true], [false, true]) {
            assert_eq!(backend.and(&a, &b), backend.and(&b, &a));
        }
    }
}
