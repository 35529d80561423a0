//! Correlation id generation.

use uuid::Uuid;

use crate::port::IdGenerator;

/// Random v4 UUIDs in simple (hyphen-free) form, safe to use as identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_identifier_safe() {
        let ids = UuidGenerator;
        let a = ids.generate();
        let b = ids.generate();

        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
