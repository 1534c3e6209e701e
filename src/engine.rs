use crate::cigar::DecodeParams;
use crate::consolidate::{EventKind, LayoutParams};
use crate::coord::{self, CoordinateMapper, Interval, Region, WholeReference};
use crate::coords::{CoordsRow, segment_from_row};
use crate::error::RecordError;
use crate::paired::{PairParams, pair_up};
use crate::sam::RawAlignment;
use crate::split::{RawType, ReadRecord, RecordSource, assemble_record, longest_index};
use crate::types::{GenomePos, HashMap, HashMapExt, HashSet, VirtualPos};
use std::cmp::Ordering;

/// Outcome counts from one ingestion pass, before pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub kept: usize,
    pub skipped_unmapped: usize,
    pub dropped: usize,
}

/// Batch-level figures computed over the reconciled records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchStats {
    pub records: usize,
    pub segments: usize,
    pub max_read_length: i64,
    pub max_alignments: usize,
    pub min_mapping_quality: f64,
    pub max_mapping_quality: f64,
}

/// Presentation orderings for the record permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortReadsBy {
    InputOrder,
    /// Natural sort on the read name.
    ReadName,
    /// Number of segments, fewest first.
    AlignmentCount,
    /// Virtual position of each read's longest segment.
    LongestPosition,
    /// Virtual position of each read's primary segment.
    PrimaryPosition,
    /// Haplotype tag: 1, then 2, then other tags, untagged reads last.
    Haplotype,
}

/// Completion handshake for fetching multiple disjoint regions from an
/// external alignment reader.
///
/// Fetches complete in any order; the accumulated union is ready only once
/// every issued fetch has come back. Counters run for the life of the
/// tracker, `take_records` drains only the record buffer.
#[derive(Debug, Default)]
pub struct FetchTracker {
    issued: usize,
    completed: usize,
    records: Vec<RawAlignment>,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outstanding region fetch.
    pub fn issue(&mut self) {
        self.issued += 1;
    }

    /// Accept one region's records and count the fetch as done.
    pub fn complete(&mut self, records: Vec<RawAlignment>) {
        self.records.extend(records);
        self.completed += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.issued
    }

    /// Drain the accumulated union of all completed fetches.
    pub fn take_records(&mut self) -> Vec<RawAlignment> {
        std::mem::take(&mut self.records)
    }
}

/// Owns the reconciled records and the virtual coordinate tables built from
/// them.
///
/// Records live in an arena addressed by index; `order` is a permutation
/// over those indices that callers may rearrange freely without touching
/// engine state. All layout knobs are explicit parameters fixed at
/// construction, except the indel-visibility threshold, which can be
/// re-applied to the same input via [`LayoutEngine::redecode`].
pub struct LayoutEngine {
    records: Vec<ReadRecord>,
    order: Vec<usize>,
    header_sizes: HashMap<String, i64>,
    intervals: Vec<Interval>,
    whole_refs: Vec<WholeReference>,
    focal_region: Option<Region>,
    additional_regions: Vec<Region>,
    paired_end_mode: bool,
    decode: DecodeParams,
    pair: PairParams,
    layout: LayoutParams,
}

impl LayoutEngine {
    pub fn new(decode: DecodeParams, pair: PairParams, layout: LayoutParams) -> Self {
        Self {
            records: Vec::new(),
            order: Vec::new(),
            header_sizes: HashMap::new(),
            intervals: Vec::new(),
            whole_refs: Vec::new(),
            focal_region: None,
            additional_regions: Vec::new(),
            paired_end_mode: false,
            decode,
            pair,
            layout,
        }
    }

    /// Install chromosome sizes from header metadata and build the initial
    /// whole-reference table so regions can be resolved before any records
    /// arrive. A chromosome without a numeric size is skipped with a warning.
    pub fn set_header_sizes(&mut self, sizes: impl IntoIterator<Item = (String, Option<i64>)>) {
        self.header_sizes.clear();
        for (chrom, size) in sizes {
            match size {
                Some(size) => {
                    self.header_sizes.insert(chrom, size);
                }
                None => {
                    tracing::warn!(%chrom, "skipping chromosome: header declares no numeric size");
                }
            }
        }
        let (_, whole_refs) = coord::build_tables(HashMap::new(), &self.header_sizes, &self.layout);
        self.whole_refs = whole_refs;
    }

    /// The region the batch was loaded around; included in the layout even
    /// when no alignment covers it.
    pub fn set_focal_region(&mut self, region: Option<Region>) {
        self.focal_region = region;
    }

    /// Add a region that must stay visible in the layout, padded by 1000 on
    /// each side when footprints are gathered.
    pub fn add_focus_region(&mut self, region: Region) {
        self.additional_regions.push(region);
    }

    /// Resolve a region's chromosome against the whole-reference table,
    /// tolerating a missing "chr" prefix; returns the region under its
    /// stored chromosome name.
    pub fn resolve_region(&self, region: &Region) -> Option<Region> {
        coord::chrom_index(&self.whole_refs, &region.chrom).map(|index| Region {
            chrom: self.whole_refs[index].chrom.clone(),
            start: region.start,
            end: region.end,
        })
    }

    /// Assemble raw alignment records and reconcile the batch.
    ///
    /// Wildcard-CIGAR records are skipped silently (unmapped reads listed in
    /// the input), malformed records are dropped with a warning, and the
    /// survivors go through paired-end reconciliation or duplicate collapse.
    pub fn ingest(&mut self, raws: impl IntoIterator<Item = RawAlignment>) -> IngestStats {
        let mut stats = IngestStats::default();
        let mut assembled = Vec::new();
        for raw in raws {
            match assemble_record(&raw, &self.decode) {
                Ok(record) => {
                    assembled.push(record);
                    stats.kept += 1;
                }
                Err(RecordError::EmptyOrWildcardCigar) => stats.skipped_unmapped += 1,
                Err(error) => {
                    tracing::warn!(read = %raw.read_name, "{error}; dropping record");
                    stats.dropped += 1;
                }
            }
        }

        let (records, paired_end_mode) = pair_up(assembled, &self.pair);
        self.records = records;
        self.paired_end_mode = paired_end_mode;
        self.order = (0..self.records.len()).collect();
        stats
    }

    /// Ingest coordinate-table rows, one record per query name (rows in
    /// input order), seeding chromosome sizes from the rows' reference
    /// lengths.
    pub fn ingest_coords(&mut self, rows: impl IntoIterator<Item = CoordsRow>) {
        let mut order: Vec<String> = Vec::new();
        let mut segments_by_query: HashMap<String, Vec<_>> = HashMap::new();
        for row in rows {
            self.header_sizes.insert(row.chrom.clone(), row.ref_total_length);
            let segments = segments_by_query.entry(row.query_name.clone()).or_insert_with(|| {
                order.push(row.query_name.clone());
                Vec::new()
            });
            segments.push(segment_from_row(&row));
        }

        self.records = order
            .into_iter()
            .filter_map(|query_name| {
                let segments = segments_by_query.remove(&query_name)?;
                Some(ReadRecord {
                    read_name: query_name,
                    raw_type: if segments.len() > 1 {
                        RawType::SplitAssembled
                    } else {
                        RawType::Single
                    },
                    longest_index: longest_index(&segments),
                    primary_index: segments.len().saturating_sub(1),
                    segments,
                    pair_link: None,
                    haplotype: None,
                    sa: None,
                    flag: 0,
                    source: RecordSource::Coords,
                })
            })
            .collect();
        self.paired_end_mode = false;
        self.order = (0..self.records.len()).collect();

        let (_, whole_refs) = coord::build_tables(HashMap::new(), &self.header_sizes, &self.layout);
        self.whole_refs = whole_refs;
    }

    /// Build the interval and whole-reference tables from every record's
    /// footprints plus the focal and additional regions, then place the
    /// survivors on the virtual axis with all chromosomes visible.
    pub fn organize(&mut self) {
        let mut events = footprint_events(self.records.iter());
        self.push_region_events(&mut events);

        let (intervals, whole_refs) = coord::build_tables(events, &self.header_sizes, &self.layout);
        self.intervals = intervals;
        self.whole_refs = whole_refs;
        self.apply_filters(&[]);
    }

    /// Consolidated intervals for a single record, spanning the same focal
    /// and additional regions as the batch layout but without the
    /// alignment-count filter.
    pub fn organize_for_read(&self, index: usize) -> Vec<Interval> {
        let mut events = footprint_events(self.records.get(index).into_iter());
        self.push_region_events(&mut events);
        let (intervals, _) = coord::build_tables(events, &self.header_sizes, &self.layout);
        intervals
    }

    fn push_region_events(&self, events: &mut HashMap<String, Vec<(GenomePos, EventKind)>>) {
        if let Some(region) = &self.focal_region {
            let chrom_events = events.entry(region.chrom.clone()).or_default();
            chrom_events.push((region.start, EventKind::Start));
            chrom_events.push((region.end, EventKind::End));
        }
        for region in &self.additional_regions {
            let chrom_events = events.entry(region.chrom.clone()).or_default();
            chrom_events.push(((region.start - 1000).max(0), EventKind::Start));
            chrom_events.push((region.end + 1000, EventKind::End));
        }
    }

    /// Reassign virtual offsets with the given chromosomes hidden; intervals
    /// under the minimum alignment count lose their place as well.
    pub fn apply_filters(&mut self, hidden_chroms: &[&str]) {
        let hidden: HashSet<String> = hidden_chroms.iter().map(|chrom| chrom.to_string()).collect();
        coord::apply_filters(
            &mut self.intervals,
            &mut self.whole_refs,
            &hidden,
            self.layout.min_alignments_for_interval,
        );
    }

    /// Rebuild every record's segments at a new indel-visibility threshold.
    /// Safe to call repeatedly; each pass produces fresh records.
    pub fn redecode(&mut self, decode: DecodeParams) {
        self.decode = decode;
        let redecoded = self
            .records
            .iter()
            .map(|record| record.redecode(&self.decode, &self.pair))
            .collect();
        self.records = redecoded;
    }

    pub fn mapper(&self) -> CoordinateMapper<'_> {
        CoordinateMapper::new(&self.intervals, &self.whole_refs)
    }

    pub fn records(&self) -> &[ReadRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&ReadRecord> {
        self.records.get(index)
    }

    /// Presentation order over record indices. Rearranging it never touches
    /// the records themselves.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn order_mut(&mut self) -> &mut [usize] {
        &mut self.order
    }

    /// Reorder the presentation permutation. Sorting is stable, so tied
    /// records keep their current relative order and the arena never moves.
    /// Position orderings read the current interval table, so apply them
    /// after [`LayoutEngine::organize`].
    pub fn sort_records(&mut self, by: SortReadsBy) {
        let records = &self.records;
        match by {
            SortReadsBy::InputOrder => self.order.sort_unstable(),
            SortReadsBy::ReadName => self
                .order
                .sort_by(|&a, &b| coord::natural_cmp(&records[a].read_name, &records[b].read_name)),
            SortReadsBy::AlignmentCount => {
                self.order.sort_by_key(|&index| records[index].segments.len());
            }
            SortReadsBy::LongestPosition | SortReadsBy::PrimaryPosition => {
                let mapper = CoordinateMapper::new(&self.intervals, &self.whole_refs);
                let keys: Vec<VirtualPos> = records
                    .iter()
                    .map(|record| {
                        let pick = match by {
                            SortReadsBy::LongestPosition => record.longest_index,
                            _ => record.primary_index,
                        };
                        let segment = &record.segments[pick];
                        mapper.map_closest(&segment.chrom, segment.ref_start).pos
                    })
                    .collect();
                self.order.sort_by_key(|&index| keys[index]);
            }
            SortReadsBy::Haplotype => {
                self.order.sort_by(|&a, &b| {
                    match (&records[a].haplotype, &records[b].haplotype) {
                        (Some(x), Some(y)) => x.cmp(y),
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    }
                });
            }
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn whole_refs(&self) -> &[WholeReference] {
        &self.whole_refs
    }

    pub fn paired_end_mode(&self) -> bool {
        self.paired_end_mode
    }

    pub fn batch_stats(&self) -> BatchStats {
        let mut stats = BatchStats { records: self.records.len(), ..BatchStats::default() };
        let mut min_mapping_quality = f64::MAX;
        for record in &self.records {
            stats.segments += record.segments.len();
            stats.max_alignments = stats.max_alignments.max(record.segments.len());
            if let Some(first) = record.segments.first() {
                stats.max_read_length = stats.max_read_length.max(first.read_length);
            }
            for segment in &record.segments {
                min_mapping_quality = min_mapping_quality.min(segment.mapping_quality);
                stats.max_mapping_quality = stats.max_mapping_quality.max(segment.mapping_quality);
            }
        }
        if min_mapping_quality != f64::MAX {
            stats.min_mapping_quality = min_mapping_quality;
        }
        stats
    }
}

fn footprint_events<'a>(
    records: impl Iterator<Item = &'a ReadRecord>,
) -> HashMap<String, Vec<(GenomePos, EventKind)>> {
    let mut events: HashMap<String, Vec<(GenomePos, EventKind)>> = HashMap::new();
    for record in records {
        for segment in &record.segments {
            let chrom_events = events.entry(segment.chrom.clone()).or_default();
            chrom_events.push((segment.ref_start.min(segment.ref_end), EventKind::Start));
            chrom_events.push((segment.ref_start.max(segment.ref_end), EventKind::End));
        }
    }
    events
}
