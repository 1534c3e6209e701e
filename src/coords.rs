use crate::cigar::PathPoint;
use crate::error::RecordError;
use crate::record::AlignmentSegment;
use crate::types::{GenomePos, ReadPos};

/// One row of an 11-column coordinate table (`show-coords -lTH` layout):
/// an indel-free alignment source that bypasses CIGAR decoding entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordsRow {
    pub ref_start: GenomePos,
    pub ref_end: GenomePos,
    pub query_start: ReadPos,
    pub query_end: ReadPos,
    pub identity: f64,
    pub ref_total_length: i64,
    pub read_length: i64,
    pub chrom: String,
    pub query_name: String,
}

/// Parse one line of a coordinate table.
///
/// Lines with fewer than 3 columns are blank or separator padding and yield
/// `Ok(None)`; any other column count than 11 is a `MalformedCoordsRow`
/// whose message spells out the expected layout.
pub fn parse_coords_line(line: &str) -> Result<Option<CoordsRow>, RecordError> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < 3 {
        return Ok(None);
    }
    if columns.len() != 11 {
        return Err(RecordError::MalformedCoordsRow {
            reason: format!("found {} columns", columns.len()),
        });
    }

    let integer = |index: usize| -> Result<i64, RecordError> {
        columns[index].parse().map_err(|_| RecordError::MalformedCoordsRow {
            reason: format!("column {} ({:?}) is not an integer", index + 1, columns[index]),
        })
    };
    let identity: f64 = columns[6].parse().map_err(|_| RecordError::MalformedCoordsRow {
        reason: format!("column 7 ({:?}) is not a number", columns[6]),
    })?;

    Ok(Some(CoordsRow {
        ref_start: integer(0)?,
        ref_end: integer(1)?,
        query_start: integer(2)?,
        query_end: integer(3)?,
        identity,
        ref_total_length: integer(7)?,
        read_length: integer(8)?,
        chrom: columns[9].to_string(),
        query_name: columns[10].to_string(),
    }))
}

/// Turn one row into a two-vertex segment. Percent identity stands in for
/// mapping quality; there is no base-level detail, so no indel size.
pub fn segment_from_row(row: &CoordsRow) -> AlignmentSegment {
    AlignmentSegment {
        chrom: row.chrom.clone(),
        ref_start: row.ref_start,
        ref_end: row.ref_end,
        query_start: row.query_start,
        query_end: row.query_end,
        mapping_quality: row.identity,
        path: vec![
            PathPoint { r: row.ref_start, q: row.query_start },
            PathPoint { r: row.ref_end, q: row.query_end },
        ],
        aligned_length: (row.ref_end - row.ref_start).abs(),
        read_length: row.read_length,
        max_indel_size: None,
    }
}
