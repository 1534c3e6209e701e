use crate::cigar::{Cigar, DecodeParams, PathPoint, Strand};
use crate::error::RecordError;
use crate::types::{GenomePos, ReadPos};

/// Phasing tag carried by a read, from the `HP` field.
///
/// Ordering puts haplotype 1 first, haplotype 2 second and anything else
/// after, which is the display order used when reads are grouped by phase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Haplotype {
    Haplotype1,
    Haplotype2,
    Unknown(String),
}

impl Haplotype {
    pub fn from_tag(tag: &str) -> Haplotype {
        match tag {
            "1" => Haplotype::Haplotype1,
            "2" => Haplotype::Haplotype2,
            other => Haplotype::Unknown(other.to_string()),
        }
    }
}

/// The raw ingredients of one alignment segment, before decoding.
///
/// A record's primary alignment yields one of these, and each `SA` tag entry
/// yields another. Keeping the parsed CIGAR here lets a record be re-decoded
/// at a different indel threshold later without re-reading any input.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSource {
    pub chrom: String,
    pub ref_start: GenomePos,
    pub strand: Strand,
    pub cigar: Cigar,
    pub mapping_quality: f64,
}

impl SegmentSource {
    /// Build a source from field-level parts, rejecting absent CIGARs.
    pub fn from_parts(
        chrom: &str,
        ref_start: GenomePos,
        strand: Strand,
        cigar_text: &str,
        mapping_quality: f64,
    ) -> Result<SegmentSource, RecordError> {
        if cigar_text.is_empty() || cigar_text == "*" {
            return Err(RecordError::EmptyOrWildcardCigar);
        }
        Ok(SegmentSource {
            chrom: chrom.to_string(),
            ref_start,
            strand,
            cigar: Cigar::parse(cigar_text)?,
            mapping_quality,
        })
    }

    /// Decode this source into a positioned segment.
    pub fn decode(&self, params: &DecodeParams) -> AlignmentSegment {
        let walk = self.cigar.decode_walk(self.ref_start, self.strand, params);
        AlignmentSegment {
            chrom: self.chrom.clone(),
            ref_start: self.ref_start,
            ref_end: self.ref_start + walk.ref_aligned_length,
            query_start: walk.query_start,
            query_end: walk.query_end,
            mapping_quality: self.mapping_quality,
            path: walk.path,
            aligned_length: walk.read_aligned_length,
            read_length: walk.read_length,
            max_indel_size: Some(walk.max_indel_size),
        }
    }
}

/// One aligned segment of a read, positioned on both axes.
///
/// `query_start`/`query_end` are in original-read orientation, so a
/// reverse-strand segment has `query_start > query_end`. `max_indel_size`
/// is `None` for segments built from coordinate tables, which carry no
/// base-level detail.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentSegment {
    pub chrom: String,
    pub ref_start: GenomePos,
    pub ref_end: GenomePos,
    pub query_start: ReadPos,
    pub query_end: ReadPos,
    pub mapping_quality: f64,
    pub path: Vec<PathPoint>,
    pub aligned_length: i64,
    pub read_length: i64,
    pub max_indel_size: Option<i64>,
}

impl AlignmentSegment {
    /// Leftmost query endpoint, regardless of strand.
    pub fn query_min(&self) -> ReadPos {
        self.query_start.min(self.query_end)
    }

    /// Rightmost query endpoint, regardless of strand.
    pub fn query_max(&self) -> ReadPos {
        self.query_start.max(self.query_end)
    }
}
