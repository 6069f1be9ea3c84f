//! LZ77 decoder implementation
//!
//! Reads a block directly out of a ROM buffer. The declared size bounds the
//! whole operation: decoding stops the moment that many bytes exist, even in
//! the middle of a control byte or a back-reference.

use crate::{HEADER_SIZE, LZ77_MARKER, Lz77Error, MIN_MATCH};

/// Parsed 4-byte block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Size of the data once decompressed
    pub decompressed_len: usize,
}

/// Result of decoding a block in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressedBlock {
    /// Decompressed bytes (exactly the declared size)
    pub data: Vec<u8>,

    /// Bytes the block occupies in the source, header included
    pub compressed_len: usize,
}

/// Cursor over the compressed input
struct Input<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Input<'_> {
    #[inline]
    fn next(&mut self, produced: usize) -> Result<u8, Lz77Error> {
        let byte = self
            .data
            .get(self.pos)
            .copied()
            .ok_or(Lz77Error::Truncated {
                position: self.pos,
                produced,
            })?;
        self.pos += 1;
        Ok(byte)
    }
}

/// Read the block header at `offset` without decoding the token stream
///
/// # Errors
/// - `Truncated` if the header runs past the end of `data`
/// - `BadMarker` if the first byte is not [`LZ77_MARKER`]
pub fn peek_header(data: &[u8], offset: usize) -> Result<BlockHeader, Lz77Error> {
    let truncated = Lz77Error::Truncated {
        position: data.len(),
        produced: 0,
    };

    let marker = *data.get(offset).ok_or(truncated)?;
    if marker != LZ77_MARKER {
        return Err(Lz77Error::BadMarker {
            offset,
            found: marker,
        });
    }

    let size = data.get(offset + 1..offset + HEADER_SIZE).ok_or(truncated)?;
    let decompressed_len = u32::from_le_bytes([size[0], size[1], size[2], 0]) as usize;

    Ok(BlockHeader { decompressed_len })
}

/// Decompress the block starting at `offset`, reporting its compressed size
///
/// # Arguments
/// * `data` - Buffer containing the block (usually the whole ROM)
/// * `offset` - Absolute offset of the marker byte
///
/// # Errors
/// - `BadMarker` if `offset` does not hold a block
/// - `Truncated` if the input ends before the declared size is produced
/// - `InvalidBackReference` if a reference reaches before the output start
pub fn decompress_block(data: &[u8], offset: usize) -> Result<DecompressedBlock, Lz77Error> {
    let header = peek_header(data, offset)?;
    let expected = header.decompressed_len;

    let mut output = Vec::with_capacity(expected);
    let mut input = Input {
        data,
        pos: offset + HEADER_SIZE,
    };

    'stream: while output.len() < expected {
        let control = input.next(output.len())?;

        for bit in (0..8).rev() {
            if output.len() >= expected {
                break 'stream;
            }

            if control & (1 << bit) == 0 {
                let literal = input.next(output.len())?;
                output.push(literal);
                continue;
            }

            let b1 = input.next(output.len())?;
            let b2 = input.next(output.len())?;
            let length = (b1 >> 4) as usize + MIN_MATCH;
            let distance = ((((b1 & 0x0F) as usize) << 8) | b2 as usize) + 1;

            if distance > output.len() {
                return Err(Lz77Error::InvalidBackReference {
                    distance,
                    available: output.len(),
                });
            }

            // Byte-by-byte so overlapping sources repeat freshly written bytes
            let start = output.len() - distance;
            let count = length.min(expected - output.len());
            for i in 0..count {
                let byte = output[start + i];
                output.push(byte);
            }
        }
    }

    Ok(DecompressedBlock {
        data: output,
        compressed_len: input.pos - offset,
    })
}

/// Decompress the block starting at `offset`
///
/// Returns exactly the number of bytes declared in the block header.
/// See [`decompress_block`] for errors.
pub fn decompress(data: &[u8], offset: usize) -> Result<Vec<u8>, Lz77Error> {
    decompress_block(data, offset).map(|block| block.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_literals() {
        let block = [0x10, 0x06, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let result = decompress_block(&block, 0).unwrap();

        assert_eq!(result.data, vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(result.compressed_len, block.len());
    }

    #[test]
    fn test_header_only() {
        // Zero size = no control byte is read at all
        let block = [0x10, 0x00, 0x00, 0x00];
        assert_eq!(decompress(&block, 0), Ok(vec![]));
    }

    #[test]
    fn test_size_is_little_endian_24_bit() {
        let block = [0x10, 0x34, 0x12, 0x01];
        let header = peek_header(&block, 0).unwrap();
        assert_eq!(header.decompressed_len, 0x01_1234);
    }

    #[test]
    fn test_bad_marker() {
        let block = [0x11, 0x01, 0x00, 0x00, 0x00, 0xAA];
        assert_eq!(
            decompress(&block, 0),
            Err(Lz77Error::BadMarker {
                offset: 0,
                found: 0x11
            })
        );
    }

    #[test]
    fn test_offset_past_end() {
        let block = [0x10, 0x01, 0x00, 0x00];
        assert!(matches!(
            decompress(&block, 10),
            Err(Lz77Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_truncated_header() {
        let block = [0x00, 0x10, 0x05];
        assert!(matches!(
            decompress(&block, 1),
            Err(Lz77Error::Truncated { produced: 0, .. })
        ));
    }

    #[test]
    fn test_truncated_stream() {
        // Declares 8 bytes, supplies 3 literals
        let block = [0x10, 0x08, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03];
        assert_eq!(
            decompress(&block, 0),
            Err(Lz77Error::Truncated {
                position: 8,
                produced: 3
            })
        );
    }

    #[test]
    fn test_truncated_reference() {
        // Control says reference, but only one of its two bytes is present
        let block = [0x10, 0x08, 0x00, 0x00, 0x40, 0xAA, 0x20];
        assert!(matches!(
            decompress(&block, 0),
            Err(Lz77Error::Truncated { produced: 1, .. })
        ));
    }

    #[test]
    fn test_overlapping_reference() {
        // literal 0xAA, then reference length 5 (nibble 2), distance 1 (field 0)
        let block = [0x10, 0x06, 0x00, 0x00, 0x40, 0xAA, 0x20, 0x00];
        assert_eq!(decompress(&block, 0), Ok(vec![0xAA; 6]));
    }

    #[test]
    fn test_reference_repeats_pattern() {
        // "AB" then reference length 4 distance 2 -> "ABABAB"
        let block = [0x10, 0x06, 0x00, 0x00, 0x20, b'A', b'B', 0x10, 0x01];
        assert_eq!(decompress(&block, 0), Ok(b"ABABAB".to_vec()));
    }

    #[test]
    fn test_invalid_back_reference() {
        // Reference as the very first token: nothing to copy from
        let block = [0x10, 0x04, 0x00, 0x00, 0x80, 0x00, 0x00];
        assert_eq!(
            decompress(&block, 0),
            Err(Lz77Error::InvalidBackReference {
                distance: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_invalid_back_reference_after_literals() {
        // Two literals, then distance 3 (field 2)
        let block = [0x10, 0x08, 0x00, 0x00, 0x20, 0x01, 0x02, 0x00, 0x02];
        assert_eq!(
            decompress(&block, 0),
            Err(Lz77Error::InvalidBackReference {
                distance: 3,
                available: 2
            })
        );
    }

    #[test]
    fn test_stops_mid_control_byte() {
        // Control 0x00 promises 8 literals but the size is 2; trailing bytes
        // must not be consumed
        let block = [0x10, 0x02, 0x00, 0x00, 0x00, 0x07, 0x08, 0xEE, 0xEE];
        let result = decompress_block(&block, 0).unwrap();

        assert_eq!(result.data, vec![0x07, 0x08]);
        assert_eq!(result.compressed_len, 7);
    }

    #[test]
    fn test_reference_clamped_to_declared_size() {
        // Reference of length 18 after one literal, but only 4 bytes declared
        let block = [0x10, 0x04, 0x00, 0x00, 0x40, 0x55, 0xF0, 0x00];
        let result = decompress(&block, 0).unwrap();
        assert_eq!(result, vec![0x55; 4]);
    }

    #[test]
    fn test_reads_at_offset() {
        let mut rom = vec![0xFF; 0x20];
        rom.extend_from_slice(&[0x10, 0x03, 0x00, 0x00, 0x00, 0x09, 0x08, 0x07]);
        let result = decompress_block(&rom, 0x20).unwrap();

        assert_eq!(result.data, vec![0x09, 0x08, 0x07]);
        assert_eq!(result.compressed_len, 8);
    }
}
