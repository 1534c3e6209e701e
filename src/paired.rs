use crate::error::RecordError;
use crate::split::{RawType, ReadRecord, RecordSource, longest_index};
use crate::types::{GenomePos, HashMap, HashMapExt, HashSet, HashSetExt};
use noodles::sam::alignment::record::Flags;

/// Policy for gluing the two mates of a pair onto one query axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairParams {
    /// Gap inserted between the mates on the shared axis.
    pub pair_spacing: i64,
    /// Mirror the second mate across the shared axis so the pair reads
    /// outside-in; when off, the second mate is shifted unchanged.
    pub flip_second_in_pair: bool,
}

impl Default for PairParams {
    fn default() -> Self {
        Self { pair_spacing: 20, flip_second_in_pair: true }
    }
}

/// One endpoint pair of the inter-mate connector, on one chromosome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkEndpoints {
    pub chrom: Option<String>,
    pub from: Option<GenomePos>,
    pub to: Option<GenomePos>,
}

/// Connector endpoints between the mates of a paired-end record, one
/// candidate per direction the connector can leave the first mate.
///
/// `rightward` anchors `from` at the first mate's outermost `ref_end` and
/// `to` at the second mate's innermost `ref_start` on the same chromosome;
/// `leftward` mirrors the roles. `diff` is the genomic span of the
/// rightward connector when both of its endpoints exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairLink {
    pub rightward: LinkEndpoints,
    pub leftward: LinkEndpoints,
    pub diff: Option<i64>,
}

/// Glue the mates of one read pair into a single record on a shared query
/// axis.
///
/// A missing mate contributes `default_read_length` to the axis but no
/// segments. First-mate segments are copied unchanged; second-mate segments
/// are flipped (`q' = total − q`) or shifted (`q' = q + first + spacing`)
/// per `params`, and every glued segment reports the combined axis length
/// as its read length.
pub fn synthesize_pair(
    first: Option<&ReadRecord>,
    second: Option<&ReadRecord>,
    default_read_length: i64,
    params: &PairParams,
) -> ReadRecord {
    let first_length = first.map_or(default_read_length, |mate| mate.segments[0].read_length);
    let second_length = second.map_or(default_read_length, |mate| mate.segments[0].read_length);
    let second_shift = first_length + params.pair_spacing;
    let total_length = first_length + params.pair_spacing + second_length;

    let mut rightward = LinkEndpoints::default();
    let mut leftward = LinkEndpoints::default();
    let mut segments = Vec::new();

    if let Some(first) = first {
        for segment in &first.segments {
            if rightward.from.is_none_or(|from| segment.ref_end > from) {
                rightward.from = Some(segment.ref_end);
                rightward.chrom = Some(segment.chrom.clone());
            }
            if leftward.to.is_none_or(|to| segment.ref_start < to) {
                leftward.to = Some(segment.ref_start);
                leftward.chrom = Some(segment.chrom.clone());
            }
            segments.push(segment.clone());
        }
    }

    if let Some(second) = second {
        for segment in &second.segments {
            let mut glued = segment.clone();
            if params.flip_second_in_pair {
                glued.query_start = total_length - segment.query_start;
                glued.query_end = total_length - segment.query_end;
                for point in &mut glued.path {
                    point.q = total_length - point.q;
                }
            } else {
                glued.query_start = segment.query_start + second_shift;
                glued.query_end = segment.query_end + second_shift;
                for point in &mut glued.path {
                    point.q += second_shift;
                }
            }

            // Connector endpoints use unmodified reference coordinates and
            // only land on the chromosome the first mate anchored.
            if rightward.chrom.as_deref() == Some(glued.chrom.as_str())
                && rightward.to.is_none_or(|to| glued.ref_start < to)
            {
                rightward.to = Some(glued.ref_start);
            }
            if leftward.chrom.as_deref() == Some(glued.chrom.as_str())
                && leftward.from.is_none_or(|from| glued.ref_end > from)
            {
                leftward.from = Some(glued.ref_end);
            }
            segments.push(glued);
        }
    }

    for segment in &mut segments {
        segment.read_length = total_length;
    }

    let diff = match (rightward.from, rightward.to) {
        (Some(from), Some(to)) => Some((to - from).abs()),
        _ => None,
    };

    let read_name = second
        .or(first)
        .map_or_else(String::new, |mate| mate.read_name.clone());

    ReadRecord {
        read_name,
        raw_type: RawType::PairedEnd,
        longest_index: longest_index(&segments),
        primary_index: segments.len().saturating_sub(1),
        segments,
        pair_link: Some(PairLink { rightward, leftward, diff }),
        haplotype: None,
        sa: None,
        flag: 0,
        source: RecordSource::Pair {
            first: first.cloned().map(Box::new),
            second: second.cloned().map(Box::new),
            default_read_length,
        },
    }
}

/// Reconcile a batch of assembled records.
///
/// Scans the first 100 records for the paired flag bit; if any carries it
/// the whole batch is treated as paired-end: records are grouped by read
/// name into first/second mates (last record wins a contested slot, records
/// with neither mate bit are dropped with a warning) and each group is glued
/// by [`synthesize_pair`], using the batch's most common read length for a
/// missing mate. Otherwise repeated primaries for the same read name are
/// collapsed. Returns the reconciled records and whether paired-end mode
/// was detected.
pub fn pair_up(records: Vec<ReadRecord>, params: &PairParams) -> (Vec<ReadRecord>, bool) {
    let paired_end_mode = records
        .iter()
        .take(100)
        .any(|record| Flags::from_bits_truncate(record.flag).is_segmented());

    if !paired_end_mode {
        return (dedup_unpaired(records), false);
    }

    tracing::info!(
        "paired-end batch: gluing mates onto a shared query axis; a mate mapped outside \
         the loaded region keeps its slot empty"
    );

    struct PairSlots {
        first: Option<ReadRecord>,
        second: Option<ReadRecord>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, PairSlots> = HashMap::new();
    // Insertion-ordered counting so the most common read length breaks ties
    // in favor of the first length seen.
    let mut length_counts: Vec<(i64, usize)> = Vec::new();

    for record in records {
        let read_length = record.segments[0].read_length;
        match length_counts.iter_mut().find(|(length, _)| *length == read_length) {
            Some((_, count)) => *count += 1,
            None => length_counts.push((read_length, 1)),
        }

        let flags = Flags::from_bits_truncate(record.flag);
        if !flags.is_first_segment() && !flags.is_last_segment() {
            let dropped = RecordError::UnrecognizedPairFlag { read: record.read_name.clone() };
            tracing::warn!("{dropped}; dropping record");
            continue;
        }

        let slots = groups.entry(record.read_name.clone()).or_insert_with(|| {
            order.push(record.read_name.clone());
            PairSlots { first: None, second: None }
        });
        if flags.is_first_segment() {
            slots.first = Some(record);
        } else {
            slots.second = Some(record);
        }
    }

    let mut default_read_length = 0;
    let mut best_count = 0;
    for &(length, count) in &length_counts {
        if count > best_count {
            best_count = count;
            default_read_length = length;
        }
    }

    let mut glued = Vec::with_capacity(order.len());
    for read_name in &order {
        if let Some(slots) = groups.remove(read_name) {
            glued.push(synthesize_pair(
                slots.first.as_ref(),
                slots.second.as_ref(),
                default_read_length,
                params,
            ));
        }
    }
    (glued, true)
}

/// Collapse repeated primary records sharing a read name.
///
/// Some aligners emit one record per alignment with no SA tags instead of
/// one record carrying its siblings. The first record for a name is kept
/// whole; each later duplicate contributes its primary segment, and only if
/// the read has no segment on that chromosome yet. The merge also fabricates
/// an SA-style entry (edit distance `0`) onto the kept record so its tag
/// text matches the merged segment set.
fn dedup_unpaired(records: Vec<ReadRecord>) -> Vec<ReadRecord> {
    let mut kept: Vec<ReadRecord> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    let mut seen_name_chrom: HashSet<(String, String)> = HashSet::new();

    for record in records {
        let Some(&kept_index) = index_by_name.get(&record.read_name) else {
            for segment in &record.segments {
                seen_name_chrom.insert((record.read_name.clone(), segment.chrom.clone()));
            }
            index_by_name.insert(record.read_name.clone(), kept.len());
            kept.push(record);
            continue;
        };

        let RecordSource::Cigar { sources } = &record.source else {
            continue;
        };
        let primary_chrom = &record.segments[record.primary_index].chrom;
        let key = (record.read_name.clone(), primary_chrom.clone());
        if seen_name_chrom.contains(&key) {
            continue;
        }
        seen_name_chrom.insert(key);

        let source = sources[record.primary_index].clone();
        let entry = format!(
            "{},{},{},{},{},0",
            source.chrom,
            source.ref_start,
            source.strand.symbol(),
            source.cigar,
            source.mapping_quality,
        );

        let target = &mut kept[kept_index];
        target.sa = Some(match target.sa.take() {
            Some(sa) if !sa.is_empty() => format!("{sa};{entry}"),
            _ => entry,
        });

        let segment = record.segments[record.primary_index].clone();
        if segment.aligned_length > target.segments[target.longest_index].aligned_length {
            target.longest_index = target.segments.len();
        }
        target.segments.push(segment);
        if let RecordSource::Cigar { sources: target_sources } = &mut target.source {
            target_sources.push(source);
        }
        target.raw_type = RawType::SplitAssembled;
    }
    kept
}
