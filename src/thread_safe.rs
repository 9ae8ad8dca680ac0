//! A pattern set that can be updated while other threads match against it.
//!
//! Readers load the current `PatternSet` through an `ArcSwap` and never block.
//! Writers take the build lock, compile a complete new set and publish it
//! with one atomic store. A reader holding a snapshot keeps using it until it
//! loads again.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::config::Options;
use crate::pattern::{MatchResult, PatternMatcher};
use crate::pattern_set::PatternSet;
use crate::PatternError;

/// Thread-safe, hot-swappable `PatternSet`.
///
/// This type is `Send + Sync` when `P` is. Matching is lock-free; updates
/// are serialized and each one recompiles the whole set.
pub struct SharedPatternSet<P> {
    /// The published set; atomically swappable, lock-free reads.
    current: ArcSwap<PatternSet<P>>,
    /// Source list the published set was compiled from.
    build_lock: Mutex<Vec<(String, P)>>,
    options: Options,
}

impl<P: Clone> SharedPatternSet<P> {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            current: ArcSwap::from_pointee(PatternSet::empty(&options)),
            build_lock: Mutex::new(Vec::new()),
            options,
        }
    }

    /// Add one pattern and publish the rebuilt set.
    ///
    /// On error nothing changes.
    pub fn add_pattern(&self, pattern: &str, payload: P) -> Result<(), PatternError> {
        let mut sources = self.build_lock.lock();
        let mut next = sources.clone();
        next.push((pattern.to_string(), payload));
        self.publish(&mut sources, next)
    }

    /// Remove every pattern carrying `payload`; returns how many were removed.
    pub fn delete_patterns(&self, payload: &P) -> Result<usize, PatternError>
    where
        P: PartialEq,
    {
        let mut sources = self.build_lock.lock();
        let next: Vec<(String, P)> = sources
            .iter()
            .filter(|(_, p)| p != payload)
            .cloned()
            .collect();
        let removed = sources.len() - next.len();
        if removed > 0 {
            self.publish(&mut sources, next)?;
        }
        Ok(removed)
    }

    /// Replace the whole set.
    pub fn replace_all<I, S>(&self, patterns: I) -> Result<(), PatternError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
    {
        let mut sources = self.build_lock.lock();
        let next = patterns
            .into_iter()
            .map(|(pattern, payload)| (pattern.as_ref().to_string(), payload))
            .collect();
        self.publish(&mut sources, next)
    }

    /// Compile `next` and, if that succeeds, make it the published set.
    fn publish(
        &self,
        sources: &mut Vec<(String, P)>,
        next: Vec<(String, P)>,
    ) -> Result<(), PatternError> {
        let set = PatternSet::compile_with(next.iter().cloned(), &self.options)?;
        self.current.store(Arc::new(set));
        *sources = next;
        Ok(())
    }

    pub fn matches(&self, text: &str) -> MatchResult<P> {
        self.current.load().matches(text)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.current.load().is_match(text)
    }

    /// The currently published set.
    pub fn snapshot(&self) -> Arc<PatternSet<P>> {
        self.current.load_full()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl<P: Clone> Default for SharedPatternSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> PatternMatcher for SharedPatternSet<P> {
    type Payload = P;

    fn matches(&self, text: &str) -> MatchResult<P> {
        SharedPatternSet::matches(self, text)
    }

    fn is_match(&self, text: &str) -> bool {
        SharedPatternSet::is_match(self, text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use super::*;
    use crate::config::MatchPolicy;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_send_sync() {
        assert_send_sync::<SharedPatternSet<String>>();
        assert_send_sync::<PatternSet<String>>();
        assert_send_sync::<crate::CompiledPattern>();
    }

    #[test]
    fn test_add_and_delete() {
        let shared = SharedPatternSet::new();
        assert!(shared.is_empty());
        assert!(!shared.is_match("cat"));

        shared.add_pattern("cat", "animal").unwrap();
        shared.add_pattern("car", "vehicle").unwrap();
        shared.add_pattern("dog", "animal").unwrap();
        assert_eq!(shared.len(), 3);
        assert_eq!(shared.matches("car").payload, Some("vehicle"));
        assert_eq!(shared.matches("dog").payload, Some("animal"));

        assert_eq!(shared.delete_patterns(&"animal").unwrap(), 2);
        assert_eq!(shared.len(), 1);
        assert!(!shared.is_match("cat"));
        assert!(shared.is_match("car"));

        assert_eq!(shared.delete_patterns(&"animal").unwrap(), 0);
    }

    #[test]
    fn test_failed_rebuild_keeps_published_set() {
        let shared = SharedPatternSet::new();
        shared.add_pattern("a+", 1).unwrap();
        let before = shared.snapshot();

        assert!(shared.add_pattern("(", 2).is_err());
        assert!(Arc::ptr_eq(&before, &shared.snapshot()));
        assert_eq!(shared.len(), 1);

        // The failed pattern was not kept for later rebuilds either.
        shared.add_pattern("b", 3).unwrap();
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn test_replace_all() {
        let shared = SharedPatternSet::new();
        shared.add_pattern("x", 0).unwrap();
        shared.replace_all([("y", 1), ("z", 2)]).unwrap();
        assert!(!shared.is_match("x"));
        assert_eq!(shared.matches("z").payload, Some(2));
    }

    #[test]
    fn test_snapshot_is_stable() {
        let shared = SharedPatternSet::new();
        shared.add_pattern("old", "v1").unwrap();
        let snapshot = shared.snapshot();

        shared.replace_all([("new", "v2")]).unwrap();
        assert!(snapshot.is_match("old"));
        assert!(!shared.is_match("old"));
        assert!(shared.is_match("new"));
    }

    #[test]
    fn test_options_are_kept() {
        let options = Options::new().match_policy(MatchPolicy::Longest);
        let shared = SharedPatternSet::with_options(options);
        shared.replace_all([("a", "short"), ("abc", "long")]).unwrap();
        assert_eq!(shared.snapshot().policy(), MatchPolicy::Longest);
        assert_eq!(shared.matches("abc").payload, Some("long"));
    }

    #[test]
    fn test_concurrent_readers_during_updates() {
        let shared = SharedPatternSet::new();
        shared.add_pattern(r"(\d+)$", "number".to_string()).unwrap();
        let done = AtomicBool::new(false);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    while !done.load(Ordering::Relaxed) {
                        // Every published set contains the number pattern.
                        let m = shared.matches("12345");
                        assert!(m.matches);
                        assert_eq!(m.payload.as_deref(), Some("number"));
                        assert_eq!(m.captures, vec!["12345"]);
                    }
                });
            }

            s.spawn(|| {
                for i in 0..50 {
                    shared.add_pattern(&format!("w{}$", i), format!("word{}", i)).unwrap();
                }
                done.store(true, Ordering::Relaxed);
            });
        });

        assert_eq!(shared.len(), 51);
        assert_eq!(shared.matches("w49").payload.as_deref(), Some("word49"));
    }
}
