use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

/// Read buffer used when streaming file content through the hasher.
const BUFFER_SIZE: usize = 64 * 1024;

/// Computes the content digest of a file on demand.
///
/// Reconciliation goes through this trait so the expensive step can be
/// observed or substituted in tests.
pub trait ContentHasher {
    /// Digest of the file's current bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn digest(&mut self, path: &Path) -> io::Result<FileDigest>;
}

/// Result of hashing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// 32 lowercase hex characters
    pub hex: String,
    /// Bytes actually read while hashing
    pub bytes_read: u64,
}

/// Streaming XXH3-128 hasher with a reusable read buffer.
pub struct Xxh3Hasher {
    buffer: Vec<u8>,
}

impl Default for Xxh3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Xxh3Hasher {
    /// Hasher with a 64 KiB read buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; BUFFER_SIZE],
        }
    }
}

impl ContentHasher for Xxh3Hasher {
    fn digest(&mut self, path: &Path) -> io::Result<FileDigest> {
        let mut file = File::open(path)?;
        let mut hasher = Xxh3::new();
        let mut bytes_read = 0u64;

        loop {
            let n = file.read(&mut self.buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&self.buffer[..n]);
            bytes_read += n as u64;
        }

        Ok(FileDigest {
            hex: format!("{:032x}", hasher.digest128()),
            bytes_read,
        })
    }
}

/// Digest of an in-memory buffer, same format as [`Xxh3Hasher`].
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    let hash = xxh3_128(data);
    format!("{hash:032x}")
}
