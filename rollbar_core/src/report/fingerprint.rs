/*!
 * Fingerprinting: a short, stable hash over a stack used to group
 * identical-looking failures.
 *
 * CRC-32 (IEEE) is plenty for grouping; it is not meant to resist
 * deliberate collisions.
 */
use std::fmt::Write as _;

use crate::protocol::types::Frame;

/**
 * Hashes the frames in order as `filename ++ method ++ line`, each field
 * terminated by a NUL byte so that neighbouring fields cannot run into each
 * other. Neither paths nor symbol names contain NUL.
 *
 * Only frame content matters, so the result is the same on every host
 * and in every process. An empty stack hashes the empty input.
 */
pub fn fingerprint(frames: &[Frame]) -> String {
    let mut canonical = String::new();
    for frame in frames {
        let _ = write!(canonical, "{}\0{}\0{}\0", frame.filename, frame.method, frame.line);
    }
    checksum_hex(canonical.as_bytes())
}

/// CRC-32 of `data` as 8 lowercase hex digits.
pub fn checksum_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32(data))
}

/// Bitwise CRC-32 with the reflected IEEE polynomial.
fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for byte in data {
        crc ^= u32::from(*byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}
