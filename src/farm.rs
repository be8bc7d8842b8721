//! Faster (but not DoS-resistant) hashmap
//!
//! Used for short lived per-document tables whose keys come from the corpus itself.
use farmhash;
use std::collections::HashMap;
use std::hash::{Hash, Hasher, BuildHasherDefault};

/// Farmhash as a streaming Hasher
///
/// farmhash isn't a streaming hash, so every write is chained onto the previous state by using
/// it as the seed. Composite keys like `(start, end)` then depend on all of their parts.
pub struct FarmHasher (u64);

impl Default for FarmHasher {
    #[inline]
    fn default() -> FarmHasher { FarmHasher(0) }
}

impl Hasher for FarmHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.0 = farmhash::hash64_with_seed(bytes, self.0);
    }
}

pub type Farm = BuildHasherDefault<FarmHasher>;
pub type FarmMap<X, Y> = HashMap<X, Y, Farm>;

pub fn new_farm<X: Hash+Eq, Y>() -> FarmMap<X, Y> {
    Default::default()
}
