//! Record body encoding/decoding.
//!
//! Field order is fixed: id, name, display name, category code, color
//! presence flag, packed color, cell count, then that many `(x, z)` pairs.
//! Counts and the color are varu32; coordinates are zigzag vars32 so small
//! negative values stay short.

use std::collections::BTreeSet;

use bytestream::{ByteReader, ByteWriter};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::types::{Category, CellPos, ClaimedAreaRecord, RecordId, Rgb};

/// Appends one encoded record to `writer`.
///
/// The record is checked against the same `limits` [`decode_record`]
/// enforces. On error `writer` may hold a partial record and should be
/// discarded.
pub fn encode_record(
    record: &ClaimedAreaRecord,
    writer: &mut ByteWriter,
    limits: &CodecLimits,
) -> CodecResult<()> {
    write_bounded_str(writer, record.id.as_str(), limits)?;
    write_bounded_str(writer, &record.name, limits)?;
    write_bounded_str(writer, &record.display_name, limits)?;
    writer.write_varu32(u32::from(record.category.code()));
    writer.write_bool(record.color.is_some());
    // The slot is always present; absent colors write zero.
    writer.write_varu32(record.color.map_or(0, Rgb::packed));
    check_count(
        LimitKind::CellsPerRecord,
        record.claimed_cells.len(),
        limits.max_cells_per_record,
    )?;
    write_count(writer, record.claimed_cells.len())?;
    for cell in &record.claimed_cells {
        encode_cell(*cell, writer);
    }
    Ok(())
}

/// Reads one record from `reader`.
pub fn decode_record(
    reader: &mut ByteReader<'_>,
    limits: &CodecLimits,
) -> CodecResult<ClaimedAreaRecord> {
    let id = RecordId::new(reader.read_str(limits.max_string_bytes)?);
    let name = reader.read_str(limits.max_string_bytes)?.to_string();
    let display_name = reader.read_str(limits.max_string_bytes)?.to_string();
    let category = Category::from_code(reader.read_varu32()?);

    let has_color = reader.read_bool()?;
    let packed = reader.read_varu32()?;
    let color = if has_color {
        Some(Rgb::from_packed(packed).ok_or(CodecError::InvalidColor { value: packed })?)
    } else {
        None
    };

    let count = reader.read_varu32()? as usize;
    check_count(LimitKind::CellsPerRecord, count, limits.max_cells_per_record)?;
    let mut claimed_cells = BTreeSet::new();
    for _ in 0..count {
        let cell = decode_cell(reader)?;
        if !claimed_cells.insert(cell) {
            return Err(CodecError::DuplicateCell {
                x: cell.x,
                z: cell.z,
            });
        }
    }

    Ok(ClaimedAreaRecord {
        id,
        name,
        display_name,
        category,
        color,
        claimed_cells,
    })
}

/// Appends a count followed by each record.
///
/// Rejects what [`decode_records`] would reject: too many records or a
/// repeated id.
pub fn encode_records(
    records: &[ClaimedAreaRecord],
    writer: &mut ByteWriter,
    limits: &CodecLimits,
) -> CodecResult<()> {
    check_count(
        LimitKind::RecordsPerSnapshot,
        records.len(),
        limits.max_records_per_snapshot,
    )?;
    write_count(writer, records.len())?;
    let mut seen = BTreeSet::new();
    for record in records {
        if !seen.insert(&record.id) {
            return Err(CodecError::DuplicateRecord {
                id: record.id.to_string(),
            });
        }
        encode_record(record, writer, limits)?;
    }
    Ok(())
}

/// Reads a counted sequence of records, preserving order.
///
/// Record ids must be unique within the sequence.
pub fn decode_records(
    reader: &mut ByteReader<'_>,
    limits: &CodecLimits,
) -> CodecResult<Vec<ClaimedAreaRecord>> {
    let count = reader.read_varu32()? as usize;
    check_count(
        LimitKind::RecordsPerSnapshot,
        count,
        limits.max_records_per_snapshot,
    )?;

    // Each record needs at least 7 bytes, so a lying count cannot
    // reserve more than the input could hold.
    let mut records = Vec::with_capacity(count.min(reader.bytes_remaining() / 7));
    let mut seen = BTreeSet::new();
    for _ in 0..count {
        let record = decode_record(reader, limits)?;
        if !seen.insert(record.id.clone()) {
            return Err(CodecError::DuplicateRecord {
                id: record.id.into_inner(),
            });
        }
        records.push(record);
    }
    Ok(records)
}

pub(crate) fn encode_cell(cell: CellPos, writer: &mut ByteWriter) {
    writer.write_vars32(cell.x);
    writer.write_vars32(cell.z);
}

pub(crate) fn decode_cell(reader: &mut ByteReader<'_>) -> CodecResult<CellPos> {
    let x = reader.read_vars32()?;
    let z = reader.read_vars32()?;
    Ok(CellPos { x, z })
}

/// Writes a string the decoder will accept under `limits`.
pub(crate) fn write_bounded_str(
    writer: &mut ByteWriter,
    value: &str,
    limits: &CodecLimits,
) -> CodecResult<()> {
    check_count(LimitKind::StringBytes, value.len(), limits.max_string_bytes)?;
    writer.write_str(value)?;
    Ok(())
}

fn check_count(kind: LimitKind, actual: usize, limit: usize) -> CodecResult<()> {
    if actual > limit {
        return Err(CodecError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}

fn write_count(writer: &mut ByteWriter, count: usize) -> CodecResult<()> {
    let count = u32::try_from(count).map_err(|_| CodecError::LengthOverflow { length: count })?;
    writer.write_varu32(count);
    Ok(())
}
