//! Streaming content digests.
//!
//! Duplicate detection keys on file content, not names, so every candidate
//! file gets a SHA-256 digest computed here.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size used while digesting a file.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Computes the SHA-256 digest of a file, returned as a 64-character
/// lowercase hex string.
///
/// The file is read in fixed-size chunks so memory use stays bounded
/// regardless of file size.
///
/// # Errors
///
/// Returns the underlying `io::Error` if the file cannot be opened or
/// becomes unreadable mid-read (deleted, locked, permissions changed).
pub fn digest_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
