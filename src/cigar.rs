use crate::error::RecordError;
use crate::types::{GenomePos, ReadPos};
use std::fmt;

/// Mapping orientation of one alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn from_symbol(c: char) -> Option<Strand> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// One vertex of an alignment's coordinate walk.
///
/// Between consecutive vertices, equal `q` with differing `r` is a
/// reference-only move (deletion/skip), equal `r` with differing `q` a
/// query-only move (insertion/clip), both differing a match/mismatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPoint {
    pub r: GenomePos,
    pub q: ReadPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    Match,
    Ins,
    Del,
    RefSkip,
    SoftClip,
    HardClip,
    Pad,
    Equal,
    Diff,
    /// Operator letter outside `MIDNSHP=X`. Decoded like a match, with a
    /// warning, so one odd aligner does not take down a whole batch.
    Other(char),
}

impl CigarOp {
    pub fn from_char(c: char) -> CigarOp {
        match c {
            'M' => CigarOp::Match,
            'I' => CigarOp::Ins,
            'D' => CigarOp::Del,
            'N' => CigarOp::RefSkip,
            'S' => CigarOp::SoftClip,
            'H' => CigarOp::HardClip,
            'P' => CigarOp::Pad,
            '=' => CigarOp::Equal,
            'X' => CigarOp::Diff,
            other => CigarOp::Other(other),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
            CigarOp::RefSkip => 'N',
            CigarOp::SoftClip => 'S',
            CigarOp::HardClip => 'H',
            CigarOp::Pad => 'P',
            CigarOp::Equal => '=',
            CigarOp::Diff => 'X',
            CigarOp::Other(c) => c,
        }
    }
}

/// A parsed CIGAR operation stream.
///
/// Parsing is strict: the whole string must tokenize as `(\d+<op>)+`.
/// Callers cache the parsed stream so the walk can be re-decoded at a new
/// indel-visibility threshold without touching the text again.
#[derive(Debug, Clone, PartialEq)]
pub struct Cigar {
    pub ops: Vec<(u32, CigarOp)>,
}

impl Cigar {
    pub fn parse(text: &str) -> Result<Cigar, RecordError> {
        let malformed = || RecordError::MalformedCigar { cigar: text.to_string() };

        let mut ops = Vec::new();
        let mut chars = text.chars().peekable();
        while chars.peek().is_some() {
            let mut len: u32 = 0;
            let mut saw_digit = false;
            while let Some(c) = chars.peek().copied() {
                let Some(digit) = c.to_digit(10) else { break };
                len = len
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or_else(malformed)?;
                saw_digit = true;
                chars.next();
            }
            if !saw_digit {
                return Err(malformed());
            }
            let op_char = chars.next().ok_or_else(malformed)?;
            ops.push((len, CigarOp::from_char(op_char)));
        }
        if ops.is_empty() {
            return Err(malformed());
        }
        Ok(Cigar { ops })
    }

    /// Total lengths implied by the operation stream, without building a path.
    ///
    /// Clips count as front padding until the first non-clip operation is
    /// seen, then as end padding. `D`, `N` and `P` all advance the reference
    /// length; `I` advances only the read length.
    pub fn lengths(&self) -> CigarLengths {
        let mut out = CigarLengths::default();
        let mut in_front = true;
        for &(len, op) in &self.ops {
            let len = len as i64;
            match op {
                CigarOp::HardClip | CigarOp::SoftClip => {
                    if in_front {
                        out.front_padding += len;
                    } else {
                        out.end_padding += len;
                    }
                }
                CigarOp::Match | CigarOp::Equal | CigarOp::Diff => {
                    in_front = false;
                    out.read_aligned += len;
                    out.ref_aligned += len;
                }
                CigarOp::Ins => {
                    in_front = false;
                    out.read_aligned += len;
                }
                CigarOp::Del | CigarOp::RefSkip | CigarOp::Pad => {
                    in_front = false;
                    out.ref_aligned += len;
                }
                CigarOp::Other(c) => {
                    tracing::warn!(
                        op = %c,
                        "unrecognized CIGAR operator, assuming it advances both query and reference"
                    );
                    out.read_aligned += len;
                    out.ref_aligned += len;
                }
            }
        }
        out
    }

    /// Decode the operation stream into a coordinate walk starting at
    /// `ref_start` on the reference.
    ///
    /// Query coordinates are reported in original-read order: forward-strand
    /// walks run `front_padding..front_padding + read_aligned`, reverse-strand
    /// walks run backward from `end_padding + read_aligned` down to
    /// `end_padding`, so `query_start > query_end` on the reverse strand.
    ///
    /// `I` and `D` operations at least `min_indel_size` long emit a pair of
    /// vertices bracketing the event; `N` always does; `P` never does.
    /// `max_indel_size` tracks the largest `I`/`D` regardless of the
    /// visibility threshold.
    pub fn decode_walk(&self, ref_start: GenomePos, strand: Strand, params: &DecodeParams) -> CigarWalk {
        let lengths = self.lengths();
        let read_length = lengths.front_padding + lengths.read_aligned + lengths.end_padding;

        let (query_start, query_end) = match strand {
            Strand::Forward => (
                lengths.front_padding,
                lengths.front_padding + lengths.read_aligned,
            ),
            Strand::Reverse => (
                lengths.end_padding + lengths.read_aligned,
                lengths.end_padding,
            ),
        };

        let mut path = Vec::with_capacity(2);
        path.push(PathPoint { r: ref_start, q: query_start });

        let (mut read_pos, step): (ReadPos, i64) = match strand {
            Strand::Forward => (0, 1),
            Strand::Reverse => (read_length, -1),
        };
        let mut ref_pos = ref_start;
        let mut max_indel_size = 0i64;

        let visible = |len: i64| params.min_indel_size != -1 && len >= params.min_indel_size;

        for &(len, op) in &self.ops {
            let len = len as i64;
            match op {
                CigarOp::HardClip | CigarOp::SoftClip => {
                    read_pos += step * len;
                }
                CigarOp::Match | CigarOp::Equal | CigarOp::Diff => {
                    read_pos += step * len;
                    ref_pos += len;
                }
                CigarOp::Ins => {
                    if visible(len) {
                        path.push(PathPoint { r: ref_pos, q: read_pos });
                        path.push(PathPoint { r: ref_pos, q: read_pos + step * len });
                    }
                    max_indel_size = max_indel_size.max(len);
                    read_pos += step * len;
                }
                CigarOp::Del => {
                    if visible(len) {
                        path.push(PathPoint { r: ref_pos, q: read_pos });
                        path.push(PathPoint { r: ref_pos + len, q: read_pos });
                    }
                    max_indel_size = max_indel_size.max(len);
                    ref_pos += len;
                }
                CigarOp::RefSkip => {
                    path.push(PathPoint { r: ref_pos, q: read_pos });
                    path.push(PathPoint { r: ref_pos + len, q: read_pos });
                    ref_pos += len;
                }
                CigarOp::Pad => {
                    ref_pos += len;
                }
                CigarOp::Other(c) => {
                    tracing::warn!(
                        op = %c,
                        "unrecognized CIGAR operator, assuming it advances both query and reference"
                    );
                    read_pos += step * len;
                    ref_pos += len;
                }
            }
        }

        path.push(PathPoint { r: ref_start + lengths.ref_aligned, q: query_end });

        CigarWalk {
            ref_aligned_length: lengths.ref_aligned,
            read_aligned_length: lengths.read_aligned,
            front_padding: lengths.front_padding,
            end_padding: lengths.end_padding,
            query_start,
            query_end,
            read_length,
            path,
            max_indel_size,
        }
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(len, op) in &self.ops {
            write!(f, "{}{}", len, op.to_char())?;
        }
        Ok(())
    }
}

/// Axis lengths implied by one CIGAR, from `Cigar::lengths`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CigarLengths {
    pub read_aligned: i64,
    pub ref_aligned: i64,
    pub front_padding: i64,
    pub end_padding: i64,
}

/// A decoded coordinate walk, from `Cigar::decode_walk`.
#[derive(Debug, Clone)]
pub struct CigarWalk {
    pub ref_aligned_length: i64,
    pub read_aligned_length: i64,
    pub front_padding: i64,
    pub end_padding: i64,
    pub query_start: ReadPos,
    pub query_end: ReadPos,
    pub read_length: i64,
    pub path: Vec<PathPoint>,
    pub max_indel_size: i64,
}

/// Knobs for the walk decode.
///
/// `min_indel_size` is the smallest insertion or deletion that earns
/// bracketing vertices; `-1` disables indel vertices entirely. Reference
/// skips (`N`) always emit vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeParams {
    pub min_indel_size: i64,
}

impl DecodeParams {
    /// Threshold used when viewing a specific region.
    pub fn region_view() -> Self {
        Self { min_indel_size: 50 }
    }
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self::region_view()
    }
}
