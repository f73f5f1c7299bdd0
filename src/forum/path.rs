//! Materialized post paths.
//!
//! A post's path is the sequence `[0, top-level id, ..., own id]`. Paths are
//! stored as BLOBs of big-endian 8-byte integers: SQLite compares BLOBs
//! bytewise and then by length, so BLOB order is exactly the lexicographic
//! order of the id sequences with prefixes first.

use std::collections::HashMap;
use std::fmt;

use crate::{AgoraError, Result};

const SEGMENT_LEN: usize = 8;

/// Ancestry path of a post.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostPath(Vec<i64>);

impl PostPath {
    /// The path of the virtual root, `[0]`.
    pub fn sentinel() -> Self {
        PostPath(vec![0])
    }

    /// Path of a direct child with the given id.
    pub fn child(&self, id: i64) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(id);
        PostPath(segments)
    }

    pub fn segments(&self) -> &[i64] {
        &self.0
    }

    /// Id of the top-level ancestor (`path[1]`), or 0 for the sentinel.
    pub fn top_level_id(&self) -> i64 {
        self.0.get(1).copied().unwrap_or(0)
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() * SEGMENT_LEN);
        for segment in &self.0 {
            bytes.extend_from_slice(&(*segment as u64).to_be_bytes());
        }
        bytes
    }

    /// Decode a stored path.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % SEGMENT_LEN != 0 {
            return Err(AgoraError::Database(format!(
                "malformed post path of {} bytes",
                bytes.len()
            )));
        }

        let segments = bytes
            .chunks_exact(SEGMENT_LEN)
            .map(|chunk| {
                let mut buf = [0u8; SEGMENT_LEN];
                buf.copy_from_slice(chunk);
                u64::from_be_bytes(buf) as i64
            })
            .collect();
        Ok(PostPath(segments))
    }
}

impl fmt::Display for PostPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Computes paths for a batch of new posts.
///
/// Seed it with the stored paths of every existing parent the batch refers
/// to; posts assigned earlier in the batch become available as parents for
/// later ones.
#[derive(Debug, Default)]
pub struct PathAssigner {
    known: HashMap<i64, PostPath>,
}

impl PathAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stored path of an existing post.
    pub fn seed(&mut self, id: i64, path: PostPath) {
        self.known.insert(id, path);
    }

    /// Whether `id` is a seeded post or was assigned earlier in the batch.
    pub fn knows(&self, id: i64) -> bool {
        self.known.contains_key(&id)
    }

    /// Assign the path for post `id` replying to `parent` (0 = top level).
    ///
    /// An unknown parent falls back to the sentinel `[0]`.
    pub fn assign(&mut self, id: i64, parent: i64) -> PostPath {
        let path = match self.known.get(&parent) {
            Some(parent_path) if parent != 0 => parent_path.child(id),
            _ => PostPath::sentinel().child(id),
        };
        self.known.insert(id, path.clone());
        path
    }
}
