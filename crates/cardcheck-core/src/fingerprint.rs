use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

const FULL_HASH_BUFFER: usize = 64 * 1024;

/// Content identity for a file: BLAKE3 over `regions` evenly spaced samples of
/// up to `chunk_bytes` each, hex encoded. Sampling offsets are derived from
/// the file size alone, so two byte-identical files produce the same identity
/// regardless of name, path, or volume.
///
/// Degenerate policy: a file smaller than the full sampling footprint
/// (`chunk_bytes * regions`) is read as a single region from offset 0, which
/// covers the whole file. An empty file hashes zero bytes. The file size is
/// deliberately not mixed into the hash — a same-size copy that matches on
/// the sampled regions but differs elsewhere must collide on identity so the
/// full-content comparison can flag it as corrupted.
pub fn fingerprint(path: &Path, chunk_bytes: usize, regions: usize) -> io::Result<String> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let regions = regions.max(1);
    let regions = if file_size < chunk_bytes as u64 * regions as u64 {
        1
    } else {
        regions
    };
    let spacing = file_size / regions as u64;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; chunk_bytes];

    for i in 0..regions {
        let offset = i as u64 * spacing;
        let remaining = file_size.saturating_sub(offset);
        let want = remaining.min(chunk_bytes as u64) as usize;
        if want == 0 {
            break;
        }
        let read = read_at(&mut file, offset, &mut buffer[..want])?;
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Streaming BLAKE3 over the entire file, hex encoded. Only called on
/// identity-matched pairs to confirm byte-for-byte equality.
pub fn full_hash(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; FULL_HASH_BUFFER];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

fn read_at(file: &mut File, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    file.seek(SeekFrom::Start(offset))?;
    let mut total = 0;
    while total < buf.len() {
        let read = file.read(&mut buf[total..])?;
        if read == 0 {
            break;
        }
        total += read;
    }
    Ok(total)
}
