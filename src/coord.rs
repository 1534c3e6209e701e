use crate::consolidate::{EventKind, LayoutParams, consolidate_chrom};
use crate::types::{GenomePos, HashMap, HashSet, VirtualPos};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One consolidated reference interval placed on the virtual axis.
///
/// `cumulative_offset` is the interval's start on the virtual axis, or the
/// sentinel `-1` when filtering removed the interval from the axis. Within
/// a chromosome, intervals are disjoint and sorted by `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub chrom: String,
    pub start: GenomePos,
    pub end: GenomePos,
    pub size: i64,
    pub cumulative_offset: VirtualPos,
    pub alignment_count: i64,
}

/// One chromosome on the whole-genome scale, from header metadata or (when
/// unknown chromosomes are allowed) guessed from alignment extents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WholeReference {
    pub chrom: String,
    pub size: i64,
    pub cumulative_offset: VirtualPos,
}

/// A genomic region, `chrom:start-end` or a single `chrom:pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub chrom: String,
    pub start: GenomePos,
    pub end: GenomePos,
}

impl FromStr for Region {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let cleaned = text.replace(',', "");
        let (chrom, range) = cleaned
            .split_once(':')
            .ok_or_else(|| format!("expected chrom:start-end, got '{text}'"))?;
        if chrom.is_empty() {
            return Err(format!("missing chromosome in '{text}'"));
        }
        let (start_text, end_text) = match range.split_once('-') {
            Some(parts) => parts,
            None => (range, range),
        };
        let start: GenomePos = start_text
            .parse()
            .map_err(|_| format!("bad start position in '{text}'"))?;
        let end: GenomePos = end_text
            .parse()
            .map_err(|_| format!("bad end position in '{text}'"))?;
        Ok(Region {
            chrom: chrom.to_string(),
            start: start.min(end),
            end: start.max(end),
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

/// Alphanumeric ordering where runs of digits (and '.') compare as numbers,
/// so "chr2" sorts before "chr10" and "chr10" before "chrX".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let aa = alnum_chunks(a);
    let bb = alnum_chunks(b);
    for (x, y) in aa.iter().zip(&bb) {
        if x == y {
            continue;
        }
        return match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(c), Ok(d)) => c.partial_cmp(&d).unwrap_or(Ordering::Equal),
            _ => x.cmp(y),
        };
    }
    aa.len().cmp(&bb.len())
}

/// Split into maximal runs of numeric (digits and '.') and non-numeric text.
fn alnum_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut numeric: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let this_numeric = c == '.' || c.is_ascii_digit();
        match numeric {
            Some(seen) if seen == this_numeric => {}
            Some(_) => {
                chunks.push(&text[start..i]);
                start = i;
                numeric = Some(this_numeric);
            }
            None => numeric = Some(this_numeric),
        }
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Index of `chrom` in the whole-reference table, also trying the query with
/// a "chr" prefix so `17` finds a stored `chr17`.
pub fn chrom_index(whole_refs: &[WholeReference], chrom: &str) -> Option<usize> {
    let prefixed = format!("chr{chrom}");
    whole_refs
        .iter()
        .position(|whole_ref| whole_ref.chrom == chrom || whole_ref.chrom == prefixed)
}

/// Consolidate per-chromosome footprint events into the interval and
/// whole-reference tables, chromosomes in natural order.
///
/// Every chromosome named by the header gets a whole-reference entry even
/// without alignments; a chromosome seen only in alignments gets one sized
/// at twice its last interval's end, unless `show_only_known_references`
/// leaves it off the whole-genome scale. Cumulative offsets run over the
/// unfiltered tables; `apply_filters` reassigns them.
pub(crate) fn build_tables(
    mut events_by_chrom: HashMap<String, Vec<(GenomePos, EventKind)>>,
    header_sizes: &HashMap<String, i64>,
    params: &LayoutParams,
) -> (Vec<Interval>, Vec<WholeReference>) {
    let mut chroms: Vec<String> = events_by_chrom.keys().cloned().collect();
    for chrom in header_sizes.keys() {
        if !events_by_chrom.contains_key(chrom) {
            chroms.push(chrom.clone());
        }
    }
    chroms.sort_by(|a, b| natural_cmp(a, b));

    let mut intervals = Vec::new();
    let mut whole_refs = Vec::new();
    let mut interval_offset: VirtualPos = 0;
    let mut whole_offset: VirtualPos = 0;

    for chrom in &chroms {
        let known_size = header_sizes.get(chrom).copied();
        let spans = match events_by_chrom.remove(chrom) {
            Some(events) => consolidate_chrom(events, known_size, params),
            None => Vec::new(),
        };

        let whole_size = match known_size {
            Some(size) => Some(size),
            None if !params.show_only_known_references => {
                spans.last().map(|span| span.end * 2)
            }
            None => None,
        };
        if let Some(size) = whole_size {
            whole_refs.push(WholeReference {
                chrom: chrom.clone(),
                size,
                cumulative_offset: whole_offset,
            });
            whole_offset += size;
        }

        for span in spans {
            let size = span.end - span.start;
            intervals.push(Interval {
                chrom: chrom.clone(),
                start: span.start,
                end: span.end,
                size,
                cumulative_offset: interval_offset,
                alignment_count: span.alignment_count,
            });
            interval_offset += size;
        }
    }
    (intervals, whole_refs)
}

/// Reassign cumulative offsets over the intervals and whole references that
/// survive the filters; everything else gets the `-1` sentinel and drops out
/// of the coordinate domain.
pub(crate) fn apply_filters(
    intervals: &mut [Interval],
    whole_refs: &mut [WholeReference],
    hidden_chroms: &HashSet<String>,
    min_alignments: i64,
) {
    let mut running: VirtualPos = 0;
    for interval in intervals.iter_mut() {
        if !hidden_chroms.contains(&interval.chrom)
            && interval.alignment_count >= min_alignments
        {
            interval.cumulative_offset = running;
            running += interval.size;
        } else {
            interval.cumulative_offset = -1;
        }
    }

    let mut running: VirtualPos = 0;
    for whole_ref in whole_refs.iter_mut() {
        if !hidden_chroms.contains(&whole_ref.chrom) {
            whole_ref.cumulative_offset = running;
            running += whole_ref.size;
        } else {
            whole_ref.cumulative_offset = -1;
        }
    }
}

/// How a [`CoordinateMapper::map_closest`] answer relates to the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Exact,
    Inexact,
    None,
}

/// A position on the virtual axis, tagged with how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedPosition {
    pub precision: Precision,
    pub pos: VirtualPos,
}

/// Read-only queries from genome coordinates into the virtual axis.
pub struct CoordinateMapper<'a> {
    intervals: &'a [Interval],
    whole_refs: &'a [WholeReference],
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(intervals: &'a [Interval], whole_refs: &'a [WholeReference]) -> Self {
        Self { intervals, whole_refs }
    }

    /// Virtual position of `(chrom, position)` when a retained interval
    /// contains it (bounds inclusive); `None` otherwise.
    pub fn map_exact(&self, chrom: &str, position: GenomePos) -> Option<VirtualPos> {
        for interval in self.intervals {
            if interval.chrom == chrom
                && interval.cumulative_offset != -1
                && position >= interval.start
                && position <= interval.end
            {
                return Some(interval.cumulative_offset + (position - interval.start));
            }
        }
        None
    }

    /// Exact mapping when possible, otherwise the virtual position of the
    /// retained interval boundary nearest to `position` on that chromosome;
    /// `Precision::None` with position 0 when the chromosome has no retained
    /// intervals at all.
    pub fn map_closest(&self, chrom: &str, position: GenomePos) -> MappedPosition {
        let mut closest: VirtualPos = 0;
        let mut best_distance: i64 = -1;
        for interval in self.intervals {
            if interval.chrom != chrom || interval.cumulative_offset == -1 {
                continue;
            }
            if position >= interval.start && position <= interval.end {
                return MappedPosition {
                    precision: Precision::Exact,
                    pos: interval.cumulative_offset + (position - interval.start),
                };
            }
            let start_distance = (position - interval.start).abs();
            if best_distance == -1 || start_distance < best_distance {
                closest = interval.cumulative_offset;
                best_distance = start_distance;
            }
            let end_distance = (position - interval.end).abs();
            if end_distance < best_distance {
                closest = interval.cumulative_offset + interval.end - interval.start;
                best_distance = end_distance;
            }
        }
        if best_distance != -1 {
            MappedPosition { precision: Precision::Inexact, pos: closest }
        } else {
            MappedPosition { precision: Precision::None, pos: closest }
        }
    }

    /// Position on the whole-genome scale, `None` for a chromosome missing
    /// from the table or hidden by filters.
    pub fn map_whole(&self, chrom: &str, position: GenomePos) -> Option<VirtualPos> {
        self.whole_refs
            .iter()
            .find(|whole_ref| whole_ref.chrom == chrom)
            .filter(|whole_ref| whole_ref.cumulative_offset != -1)
            .map(|whole_ref| whole_ref.cumulative_offset + position)
    }

    /// Whole-reference lookup with "chr"-prefix tolerance (see
    /// [`chrom_index`]).
    pub fn chrom_index(&self, chrom: &str) -> Option<usize> {
        chrom_index(self.whole_refs, chrom)
    }
}
