use crate::cigar::{DecodeParams, Strand};
use crate::error::RecordError;
use crate::paired::{PairLink, PairParams, synthesize_pair};
use crate::record::{AlignmentSegment, Haplotype, SegmentSource};
use crate::sam::RawAlignment;

/// How a record entered the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawType {
    Single,
    SplitAssembled,
    PairedEnd,
}

/// The raw material a record keeps so its segments can be rebuilt at a
/// different indel-visibility threshold without re-reading input.
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// Parsed CIGAR-backed sources, in segment order (primary last).
    Cigar { sources: Vec<SegmentSource> },
    /// The mates glued into a paired-end record, kept whole so the pair
    /// axis can be rebuilt after each side is re-decoded.
    Pair {
        first: Option<Box<ReadRecord>>,
        second: Option<Box<ReadRecord>>,
        default_read_length: i64,
    },
    /// Coordinate-table rows carry no base-level detail to re-decode.
    Coords,
}

/// One logical read with all of its aligned segments.
///
/// `primary_index` points at the read's true primary alignment,
/// `longest_index` at the segment with the greatest aligned length (first
/// wins ties). Never mutated after assembly; a threshold change produces a
/// fresh record via [`ReadRecord::redecode`].
#[derive(Debug, Clone)]
pub struct ReadRecord {
    pub read_name: String,
    pub raw_type: RawType,
    pub segments: Vec<AlignmentSegment>,
    pub primary_index: usize,
    pub longest_index: usize,
    pub pair_link: Option<PairLink>,
    pub haplotype: Option<Haplotype>,
    pub sa: Option<String>,
    pub flag: u16,
    pub source: RecordSource,
}

impl ReadRecord {
    /// Rebuild the segment list from the retained sources at a new
    /// threshold, returning a fresh record and leaving this one untouched.
    pub fn redecode(&self, decode: &DecodeParams, pair: &PairParams) -> ReadRecord {
        match &self.source {
            RecordSource::Cigar { sources } => {
                let segments: Vec<AlignmentSegment> =
                    sources.iter().map(|source| source.decode(decode)).collect();
                let longest_index = longest_index(&segments);
                ReadRecord { segments, longest_index, ..self.clone() }
            }
            RecordSource::Pair { first, second, default_read_length } => {
                let first = first.as_deref().map(|mate| mate.redecode(decode, pair));
                let second = second.as_deref().map(|mate| mate.redecode(decode, pair));
                synthesize_pair(first.as_ref(), second.as_ref(), *default_read_length, pair)
            }
            RecordSource::Coords => self.clone(),
        }
    }
}

/// Index of the segment with the greatest aligned length, first wins ties.
pub(crate) fn longest_index(segments: &[AlignmentSegment]) -> usize {
    let mut longest = 0;
    for (i, segment) in segments.iter().enumerate() {
        if segment.aligned_length > segments[longest].aligned_length {
            longest = i;
        }
    }
    longest
}

/// Parse an SA tag's semicolon-separated entries into segment sources.
///
/// Each well-formed entry is `chrom,pos,strand,cigar,mq,nm`. Undecodable
/// entries are dropped with a warning so one bad entry cannot take the rest
/// of the read's alignments with it; the empty tail after the final
/// semicolon is skipped silently.
pub fn parse_sa_entries(sa: &str) -> Vec<SegmentSource> {
    let mut sources = Vec::new();
    for entry in sa.split(';') {
        let fields: Vec<&str> = entry.split(',').collect();
        if fields.len() >= 6 {
            match sa_entry_source(entry, &fields) {
                Ok(source) => sources.push(source),
                Err(error) => tracing::warn!("dropping SA entry: {error}"),
            }
        } else if fields.len() > 1 {
            tracing::warn!(entry, "ignoring SA entry without all 6 fields");
        }
    }
    sources
}

fn sa_entry_source(entry: &str, fields: &[&str]) -> Result<SegmentSource, RecordError> {
    let malformed = |reason: &str| RecordError::MalformedSaEntry {
        entry: entry.to_string(),
        reason: reason.to_string(),
    };

    let pos: i64 = fields[1].parse().map_err(|_| malformed("invalid position"))?;
    let strand = match fields[2] {
        "+" => Strand::Forward,
        "-" => Strand::Reverse,
        _ => return Err(malformed("invalid strand")),
    };
    let mapping_quality: i64 = fields[4]
        .parse()
        .map_err(|_| malformed("invalid mapping quality"))?;
    SegmentSource::from_parts(fields[0], pos, strand, fields[3], mapping_quality as f64)
}

/// Assemble one raw alignment record, with any SA-tag siblings, into a
/// `ReadRecord`. The primary segment is decoded last so it sits at the end
/// of the segment list.
///
/// Fails with `EmptyOrWildcardCigar` for unmapped-but-listed reads (callers
/// skip those silently) and `MalformedCigar` when the primary CIGAR does not
/// parse (callers drop the record with a warning).
pub fn assemble_record(raw: &RawAlignment, params: &DecodeParams) -> Result<ReadRecord, RecordError> {
    let primary = raw.primary_source()?;

    let mut sources = match raw.sa.as_deref() {
        Some(sa) if !sa.is_empty() => parse_sa_entries(sa),
        _ => Vec::new(),
    };
    sources.push(primary);

    let segments: Vec<AlignmentSegment> =
        sources.iter().map(|source| source.decode(params)).collect();
    let primary_index = segments.len() - 1;

    let nominal_length = segments[primary_index].read_length;
    for segment in &segments {
        if segment.read_length != nominal_length {
            let mismatch = RecordError::ReadLengthMismatch {
                read: raw.read_name.clone(),
                expected: nominal_length,
                got: segment.read_length,
            };
            tracing::warn!("{mismatch}; keeping the primary's read length");
        }
    }

    let raw_type = if segments.len() > 1 { RawType::SplitAssembled } else { RawType::Single };
    Ok(ReadRecord {
        read_name: raw.read_name.clone(),
        raw_type,
        longest_index: longest_index(&segments),
        primary_index,
        segments,
        pair_link: None,
        haplotype: raw.haplotype(),
        sa: raw.sa.clone(),
        flag: raw.flag,
        source: RecordSource::Cigar { sources },
    })
}
