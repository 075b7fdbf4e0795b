//! BZIP2 record reassembly
//!
//! Block-compressed volumes store the message stream as a run of
//! independent BZIP2 streams, each preceded by a signed big-endian control
//! word whose magnitude is the compressed length. Decompressing every block in
//! order and concatenating the output recovers the uncompressed stream.

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;
use bzip2::bufread::BzDecoder;
use tracing::{debug, trace, warn};

use super::format::{COMPRESSION_RECORD_SIZE, CONTROL_WORD_SIZE};
use crate::{DecodeError, Result};

/// Decompress all BZIP2 blocks starting at the first control word
///
/// The leading compression record of the combined output is dropped, so the
/// result begins at the first message header.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] if a block is not a complete BZIP2 stream
pub fn reassemble(blocks: &[u8]) -> Result<Bytes> {
    let mut combined = Vec::with_capacity(blocks.len() * 8);
    let mut rest = blocks;
    let mut block_count = 0usize;

    while !rest.is_empty() {
        if rest.len() <= CONTROL_WORD_SIZE {
            warn!(
                "Ignoring {} trailing bytes after BZIP2 block {}",
                rest.len(),
                block_count
            );
            break;
        }

        let declared = (&rest[..CONTROL_WORD_SIZE]).read_i32::<BigEndian>()?;
        let body = &rest[CONTROL_WORD_SIZE..];
        let bound = match usize::try_from(declared.unsigned_abs()) {
            Ok(0) | Err(_) => body.len(),
            Ok(n) => n.min(body.len()),
        };

        let (inflated, consumed) = decompress_block(&body[..bound], block_count)?;
        if consumed != bound {
            trace!(
                "BZIP2 block {} used {} of {} declared bytes",
                block_count,
                consumed,
                bound
            );
        }
        debug!(
            "BZIP2 block {}: {} -> {} bytes",
            block_count,
            consumed,
            inflated.len()
        );

        combined.extend_from_slice(&inflated);
        rest = &body[consumed..];
        block_count += 1;
    }

    if combined.len() < COMPRESSION_RECORD_SIZE {
        return Err(DecodeError::Truncated {
            context: "decompressed message stream",
            offset: 0,
            needed: COMPRESSION_RECORD_SIZE,
            available: combined.len(),
        });
    }

    debug!(
        "Reassembled {} BZIP2 blocks into {} bytes",
        block_count,
        combined.len()
    );

    Ok(Bytes::from(combined).slice(COMPRESSION_RECORD_SIZE..))
}

/// Decompress one BZIP2 stream, returning the output and the input bytes used
fn decompress_block(input: &[u8], index: usize) -> Result<(Vec<u8>, usize)> {
    let mut decoder = BzDecoder::new(input);
    let mut out = Vec::with_capacity(input.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::Format(format!("Invalid BZIP2 block {index}: {e}")))?;

    let unused = decoder.into_inner().len();
    Ok((out, input.len() - unused))
}
