//! API-key pool with a pluggable selection strategy.
//!
//! Keys are fixed when the pool is built; selection only touches an atomic
//! cursor (round-robin) or the thread-local RNG (random), so the pool can be
//! shared across request tasks without locking.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// How the next key is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySelection {
    #[default]
    RoundRobin,
    Random,
}

impl FromStr for KeySelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round_robin" | "round-robin" | "roundrobin" => Ok(KeySelection::RoundRobin),
            "random" => Ok(KeySelection::Random),
            other => Err(format!("Unknown key selection strategy: {}", other)),
        }
    }
}

/// Strategy for picking an index into a non-empty key list.
pub trait KeySelector: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Cycles through keys in order.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl KeySelector for RoundRobin {
    fn pick(&self, len: usize) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % len
    }
}

/// Picks a key uniformly at random.
#[derive(Debug, Default)]
pub struct RandomChoice;

impl KeySelector for RandomChoice {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Immutable set of API keys.
pub struct KeyPool {
    keys: Vec<String>,
    selector: Box<dyn KeySelector>,
}

impl KeyPool {
    pub fn new(keys: impl IntoIterator<Item = String>, selection: KeySelection) -> Self {
        let keys = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let selector: Box<dyn KeySelector> = match selection {
            KeySelection::RoundRobin => Box::new(RoundRobin::default()),
            KeySelection::Random => Box::new(RandomChoice),
        };
        Self { keys, selector }
    }

    /// Build a pool from a comma- or newline-separated list.
    pub fn parse(raw: &str, selection: KeySelection) -> Self {
        Self::new(
            raw.split(|c| c == ',' || c == '\n').map(str::to_string),
            selection,
        )
    }

    /// Next key, or `None` if the pool is empty.
    pub fn select(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let idx = self.selector.pick(self.keys.len());
        self.keys.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPool")
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blanks() {
        let pool = KeyPool::parse(" a ,\nb\n\n, ,c", KeySelection::RoundRobin);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_round_robin_cycles() {
        let pool = KeyPool::parse("a,b,c", KeySelection::RoundRobin);
        let picked: Vec<_> = (0..5).map(|_| pool.select().unwrap().to_string()).collect();
        assert_eq!(picked, vec!["a", "b", "c", "a", "b"]);
    }

    #[test]
    fn test_random_stays_in_pool() {
        let pool = KeyPool::parse("a,b", KeySelection::Random);
        for _ in 0..20 {
            let key = pool.select().unwrap();
            assert!(key == "a" || key == "b");
        }
    }

    #[test]
    fn test_empty_pool() {
        let pool = KeyPool::parse("  \n ", KeySelection::RoundRobin);
        assert!(pool.is_empty());
        assert!(pool.select().is_none());
    }

    #[test]
    fn test_selection_from_str() {
        assert_eq!("random".parse::<KeySelection>().unwrap(), KeySelection::Random);
        assert_eq!(
            "Round_Robin".parse::<KeySelection>().unwrap(),
            KeySelection::RoundRobin
        );
        assert!("lru".parse::<KeySelection>().is_err());
    }

    #[test]
    fn test_debug_hides_keys() {
        let pool = KeyPool::parse("secret-key", KeySelection::RoundRobin);
        assert!(!format!("{:?}", pool).contains("secret-key"));
    }
}
