use crate::types::GenomePos;

/// Whether a sweep event opens or closes an alignment footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    End,
}

/// One consolidated stretch of reference covered by alignment footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: GenomePos,
    pub end: GenomePos,
    pub alignment_count: i64,
}

/// Policy for consolidating footprints into reference intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Footprints closer than this merge into one interval.
    pub merge_margin: i64,
    /// Replace a chromosome's intervals with the whole chromosome once they
    /// cover more than this fraction of its known length.
    pub whole_ref_fraction: f64,
    /// Intervals backed by fewer alignments than this lose their place on
    /// the virtual axis when filters are applied.
    pub min_alignments_for_interval: i64,
    /// Leave out chromosomes whose total length the header does not declare.
    pub show_only_known_references: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            merge_margin: 10_000,
            whole_ref_fraction: 0.3,
            min_alignments_for_interval: 1,
            show_only_known_references: true,
        }
    }
}

/// Merge possibly-overlapping footprints into disjoint, ordered spans.
///
/// End events are pushed out by `margin` before sorting, so footprints
/// within `margin` of each other land in one span; the margin is subtracted
/// back out of every reported end, so it never appears in the output bounds.
/// `alignment_count` is the number of Start events each span absorbed.
pub fn planesweep(mut events: Vec<(GenomePos, EventKind)>, margin: i64) -> Vec<Span> {
    for (pos, kind) in &mut events {
        if *kind == EventKind::End {
            *pos += margin;
        }
    }
    // Stable by position: the Start of a zero-length footprint stays ahead
    // of its own End.
    events.sort_by_key(|&(pos, _)| pos);

    let mut spans = Vec::new();
    let mut coverage = 0i64;
    let mut alignment_count = 0i64;
    let mut span_start: GenomePos = -1;
    for (pos, kind) in events {
        match kind {
            EventKind::Start => {
                coverage += 1;
                alignment_count += 1;
                if coverage == 1 {
                    span_start = pos;
                }
            }
            EventKind::End => {
                coverage -= 1;
                if coverage == 0 {
                    spans.push(Span { start: span_start, end: pos - margin, alignment_count });
                    alignment_count = 0;
                }
            }
        }
    }
    spans
}

/// Consolidate one chromosome's footprint events.
///
/// When the chromosome's total length is known and the consolidated spans
/// cover more than `whole_ref_fraction` of it, the spans collapse into a
/// single whole-chromosome span carrying their summed alignment count.
pub fn consolidate_chrom(
    events: Vec<(GenomePos, EventKind)>,
    known_size: Option<i64>,
    params: &LayoutParams,
) -> Vec<Span> {
    let spans = planesweep(events, params.merge_margin);
    let Some(size) = known_size else {
        return spans;
    };
    if size <= 0 {
        return spans;
    }

    let covered: i64 = spans.iter().map(|span| span.end - span.start).sum();
    if covered as f64 / size as f64 > params.whole_ref_fraction {
        let alignment_count = spans.iter().map(|span| span.alignment_count).sum();
        return vec![Span { start: 0, end: size, alignment_count }];
    }
    spans
}
