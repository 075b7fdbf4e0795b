//! Message stream framing
//!
//! Walks the uncompressed message stream, decoding each record by type and
//! advancing to the next message header. Message 31 records are variable
//! length; everything else occupies a fixed record slot.

use bytes::Bytes;
use tracing::{debug, trace, warn};

use super::{
    digital, legacy, vcp, MessageBody, MessageHeader, Radial, Record, MSG_DIGITAL_RADIAL,
    MSG_LEGACY_RADIAL, MSG_MODEL_DATA, MSG_VCP,
};
use crate::archive::format::RECORD_SIZE;
use crate::{DecodeError, Result};

/// Decode every record in a message stream
///
/// Records whose bodies are cut short are logged and skipped by one record
/// slot. Framing stops when fewer bytes than a message header remain.
///
/// # Errors
///
/// Returns error only for failures that are not attributable to damaged
/// input, such as a schema lookup bug
pub fn frame_records(payload: &Bytes) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut pos = 0usize;
    let mut skipped = 0usize;

    while pos < payload.len() {
        if payload.len() - pos < MessageHeader::SIZE {
            debug!(
                "Ignoring {} trailing bytes at offset {}",
                payload.len() - pos,
                pos
            );
            break;
        }

        let header = MessageHeader::decode_at(payload, pos)?;
        match decode_record(payload, pos, &header) {
            Ok((next, body)) => {
                records.push(Record {
                    offset: pos,
                    header,
                    body,
                });
                pos = next;
            }
            Err(e) if e.is_recoverable() => {
                warn!(
                    "Skipping message type {} at offset {}: {}",
                    header.msg_type, pos, e
                );
                skipped += 1;
                pos += RECORD_SIZE;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        "Framed {} records ({} skipped) from {} bytes",
        records.len(),
        skipped,
        payload.len()
    );

    Ok(records)
}

/// Decode one record body and compute the offset of the next header
fn decode_record(payload: &Bytes, pos: usize, header: &MessageHeader) -> Result<(usize, MessageBody)> {
    let body_start = pos + MessageHeader::SIZE;

    match header.msg_type {
        MSG_DIGITAL_RADIAL => {
            // Size counts halfwords from the start of the header; the next
            // record's CTM bytes follow, except after the final message
            let end = pos + usize::from(header.size) * 2;
            let body = bounded(payload, body_start, end, "message 31 body")?;
            let next = end + CTM_SIZE;
            let radial = digital::decode(&body)?;
            Ok((next, MessageBody::Radial(Radial::Digital(Box::new(radial)))))
        }
        MSG_VCP => {
            let body = payload.slice(body_start..(pos + RECORD_SIZE).min(payload.len()));
            let pattern = vcp::decode(&body)?;
            Ok((pos + RECORD_SIZE, MessageBody::CoveragePattern(Box::new(pattern))))
        }
        MSG_MODEL_DATA => {
            trace!("Skipping model data message at offset {}", pos);
            Ok((body_start + header.segmented_size(), MessageBody::Skipped))
        }
        MSG_LEGACY_RADIAL => {
            let body = payload.slice(body_start..(pos + RECORD_SIZE).min(payload.len()));
            let radial = legacy::decode(&body)?;
            Ok((pos + RECORD_SIZE, MessageBody::Radial(Radial::Legacy(Box::new(radial)))))
        }
        _ => Ok((pos + RECORD_SIZE, MessageBody::Skipped)),
    }
}

/// Channel terminal manager bytes preceding every message header
const CTM_SIZE: usize = 12;

fn bounded(payload: &Bytes, start: usize, end: usize, context: &'static str) -> Result<Bytes> {
    if end > payload.len() {
        return Err(DecodeError::Truncated {
            context,
            offset: start,
            needed: end.saturating_sub(start),
            available: payload.len().saturating_sub(start),
        });
    }
    Ok(payload.slice(start..end.max(start)))
}
