//! LZ77 encoder implementation
//!
//! Greedy longest-match search over hash chains. Any stream the decoder
//! accepts is valid, so the output is not expected to match the bytes of
//! blocks found in existing ROMs - only to decompress to the same data.

use crate::{HEADER_SIZE, LZ77_MARKER, Lz77Error, MAX_DECOMPRESSED_SIZE, MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

const HASH_BITS: u32 = 12;
const HASH_SIZE: usize = 1 << HASH_BITS;

/// Candidates examined per position before settling for the best so far
const MAX_CHAIN: usize = 256;

const NIL: usize = usize::MAX;

#[inline]
fn hash3(data: &[u8], pos: usize) -> usize {
    let key = (data[pos] as u32) << 16 | (data[pos + 1] as u32) << 8 | data[pos + 2] as u32;
    (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

/// Hash chains over every position that starts a 3-byte prefix
struct MatchFinder {
    head: Vec<usize>,
    prev: Vec<usize>,
}

impl MatchFinder {
    fn new(len: usize) -> Self {
        Self {
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; len],
        }
    }

    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let hash = hash3(data, pos);
        self.prev[pos] = self.head[hash];
        self.head[hash] = pos;
    }

    /// Longest match for `pos` as `(distance, length)`, if one reaches MIN_MATCH
    fn longest_match(&self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_MATCH > data.len() {
            return None;
        }

        let max_len = MAX_MATCH.min(data.len() - pos);
        let mut best: Option<(usize, usize)> = None;
        let mut best_len = MIN_MATCH - 1;
        let mut candidate = self.head[hash3(data, pos)];
        let mut remaining = MAX_CHAIN;

        // Chains run newest first, so distance only grows along the walk
        while candidate != NIL && remaining > 0 {
            let distance = pos - candidate;
            if distance > WINDOW_SIZE {
                break;
            }

            // Source may run into the bytes being matched; the decoder copies
            // byte by byte so overlapping references are fine
            let len = (0..max_len)
                .take_while(|&i| data[candidate + i] == data[pos + i])
                .count();

            if len > best_len {
                best_len = len;
                best = Some((distance, len));
                if len == max_len {
                    break;
                }
            }

            candidate = self.prev[candidate];
            remaining -= 1;
        }

        best
    }
}

/// Compress raw bytes into a complete block (header + token stream)
///
/// # Errors
/// Returns `InputTooLarge` if `raw` exceeds the 24-bit size field
pub fn compress(raw: &[u8]) -> Result<Vec<u8>, Lz77Error> {
    if raw.len() > MAX_DECOMPRESSED_SIZE {
        return Err(Lz77Error::InputTooLarge(raw.len()));
    }

    // Worst case: every byte a literal plus one control byte per 8 tokens
    let mut out = Vec::with_capacity(HEADER_SIZE + raw.len() + raw.len().div_ceil(8));
    out.push(LZ77_MARKER);
    out.extend_from_slice(&(raw.len() as u32).to_le_bytes()[..3]);

    let mut finder = MatchFinder::new(raw.len());
    let mut pos = 0;
    let mut control_idx = 0;
    let mut token = 0;

    while pos < raw.len() {
        if token == 0 {
            control_idx = out.len();
            out.push(0);
        }

        match finder.longest_match(raw, pos) {
            Some((distance, length)) => {
                let length_field = (length - MIN_MATCH) as u8;
                let distance_field = distance - 1;

                out[control_idx] |= 0x80 >> token;
                out.push(length_field << 4 | (distance_field >> 8) as u8);
                out.push((distance_field & 0xFF) as u8);

                for p in pos..pos + length {
                    finder.insert(raw, p);
                }
                pos += length;
            }
            None => {
                out.push(raw[pos]);
                finder.insert(raw, pos);
                pos += 1;
            }
        }

        token = (token + 1) % 8;
    }

    tracing::debug!(
        raw_len = raw.len(),
        compressed_len = out.len(),
        "compressed LZ77 block"
    );

    Ok(out)
}
