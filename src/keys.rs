//! Command key generation.
//!
//! Every emitted [`Command`](crate::command::Command) carries a unique `key`.
//! Keys are drawn from an injected [`KeyGenerator`] rather than hidden global
//! state, so tests can supply deterministic ids and compare command lists
//! exactly.

use uuid::Uuid;

/// Source of unique command keys.
pub trait KeyGenerator {
    /// Produce the next key.
    fn next_key(&mut self) -> String;
}

/// Random v4 UUID keys (production default).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn next_key(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic keys of the form `<prefix><n>`, counting from zero.
#[derive(Debug, Clone)]
pub struct SequentialKeyGenerator {
    prefix: String,
    next: u64,
}

impl SequentialKeyGenerator {
    /// Create a generator emitting `<prefix>0`, `<prefix>1`, ...
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Number of keys issued so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

impl Default for SequentialKeyGenerator {
    fn default() -> Self {
        Self::new("cmd-")
    }
}

impl KeyGenerator for SequentialKeyGenerator {
    fn next_key(&mut self) -> String {
        let key = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_keys_count_up() {
        let mut keys = SequentialKeyGenerator::new("k");
        assert_eq!(keys.next_key(), "k0");
        assert_eq!(keys.next_key(), "k1");
        assert_eq!(keys.issued(), 2);
    }

    #[test]
    fn test_uuid_keys_are_unique() {
        let mut keys = UuidKeyGenerator;
        assert_ne!(keys.next_key(), keys.next_key());
    }
}
