//! The embedding call itself is an opaque collaborator; this module only
//! defines the boundary and a deterministic stand-in for tests.

use async_trait::async_trait;

/// Turns text into a dense vector for similarity search.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text`.
    async fn embed(&self, text: &str) -> Vec<f32>;
}

/// A deterministic embedding stand-in: hashes overlapping character
/// trigrams into a fixed-width vector, so semantically similar (i.e.
/// lexically overlapping) strings land close together under cosine
/// similarity without requiring a real model.
#[derive(Debug, Clone, Copy)]
pub struct MockEmbeddingProvider {
    dims: usize,
}

impl MockEmbeddingProvider {
    /// An embedding provider producing `dims`-wide vectors.
    #[must_use]
    pub const fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dims];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();
        if chars.len() < 3 {
            return vector;
        }
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            let bucket = (fnv1a(&trigram) as usize) % self.dims;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
