//! Default embedding backend: hashed character trigrams.
//!
//! Each text is lowercased, non-alphanumeric characters are mapped to
//! spaces, and every character trigram is hashed (FNV-1a) into one of
//! `dim` signed buckets. The resulting vector is L2-normalized. This is
//! deliberately model-free: inference is instant, fully deterministic
//! across runs and platforms, and needs no downloaded weights. Related
//! strings share trigrams and therefore score high cosine similarity,
//! which is what the semantic matcher needs from a fallback backend.

use async_trait::async_trait;

use super::{EmbedError, Embedder};

pub const DEFAULT_DIM: usize = 256;

const TRIGRAM: usize = 3;

pub struct HashedNgramEmbedder {
    dim: usize,
}

impl HashedNgramEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; self.dim];

        let normalized: Vec<char> = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();

        for window in normalized.windows(TRIGRAM) {
            if window.iter().all(|c| *c == ' ') {
                continue;
            }
            let h = fnv1a(window);
            let idx = ((h >> 1) as usize) % self.dim;
            let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIM)
    }
}

#[async_trait]
impl Embedder for HashedNgramEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

fn fnv1a(chars: &[char]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &c in chars {
        for byte in (c as u32).to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
    hash
}
