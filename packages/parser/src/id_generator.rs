use crc32fast::Hasher;

/// Seed derived from a document name using CRC32
pub fn get_document_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for element nodes.
///
/// Ids are never reused: the counter only moves forward, so elements created
/// by later edits never collide with ids handed out at parse time.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(document_name: &str) -> Self {
        Self {
            seed: get_document_seed(document_name),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Advance past `id` when it is one of this generator's ids, so an id
    /// that entered the tree from outside is never handed out again
    pub fn reserve(&mut self, id: &str) {
        let n = id
            .strip_prefix(self.seed.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(n) = n {
            self.count = self.count.max(n);
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids handed out so far
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("<anonymous>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_seed_generation() {
        let id1 = get_document_seed("/home.jsx");
        let id2 = get_document_seed("/home.jsx");
        assert_eq!(id1, id2);

        let id3 = get_document_seed("/cart.jsx");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("/test.jsx");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id3.ends_with("-3"));

        let seed = gen.seed();
        assert!(id1.starts_with(seed));
        assert!(id3.starts_with(seed));
        assert_eq!(gen.count(), 3);
    }

    #[test]
    fn test_reserve_skips_taken_ids() {
        let mut gen = IdGenerator::from_seed("abc");
        gen.reserve("abc-4");
        gen.reserve("abc-2");
        gen.reserve("other-9");
        gen.reserve("abc-x");
        assert_eq!(gen.new_id(), "abc-5");
    }
}
