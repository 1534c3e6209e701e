use splitweave_rs::{
    DecodeParams, Haplotype, LayoutEngine, LayoutParams, PairParams, RawAlignment, RawType,
    ReadRecord, Strand, assemble_record, pair_up, parse_coords_line, parse_record_line,
    parse_sa_entries, synthesize_pair,
};

fn sam_record(line: &str) -> RawAlignment {
    parse_record_line(line).expect("record line should parse")
}

fn assemble(line: &str) -> ReadRecord {
    assemble_record(&sam_record(line), &DecodeParams::region_view())
        .expect("record should assemble")
}

// ── single-record assembly ──────────────────────────────────────────────

#[test]
fn a_lone_primary_stays_single() {
    let record = assemble("readS\t0\tchr1\t100\t60\t100M\t*\t0\t0\t*\t*");
    assert_eq!(record.raw_type, RawType::Single);
    assert_eq!(record.segments.len(), 1);
    assert_eq!(record.primary_index, 0);
    assert_eq!(record.longest_index, 0);
    assert!(record.sa.is_none());
}

/// Every SA entry yields a segment; the primary alignment always sits last.
#[test]
fn sa_entries_become_segments_before_the_primary() {
    let record = assemble(
        "readA\t0\tchr1\t100\t60\t50M50S\t*\t0\t0\t*\t*\tSA:Z:chr2,500,-,50S50M,30,1;",
    );
    assert_eq!(record.raw_type, RawType::SplitAssembled);
    assert_eq!(record.segments.len(), 2);
    assert_eq!(record.segments[0].chrom, "chr2");
    assert_eq!(record.segments[0].mapping_quality, 30.0);
    assert_eq!(record.segments[1].chrom, "chr1");
    assert_eq!(record.primary_index, 1);
    assert_eq!(record.longest_index, 0);
    assert_eq!(record.sa.as_deref(), Some("chr2,500,-,50S50M,30,1;"));
    // the reverse-strand entry keeps original-read orientation
    assert!(record.segments[0].query_start > record.segments[0].query_end);
}

#[test]
fn sa_text_parses_entry_by_entry() {
    let sources = parse_sa_entries("chr1,100,+,50M,60,0;chr2,200,-,25M25S,13,4;");
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].chrom, "chr1");
    assert_eq!(sources[1].strand, Strand::Reverse);
    assert_eq!(sources[1].mapping_quality, 13.0);
}

/// An SA entry whose clip arithmetic disagrees with the primary is kept with
/// its own read length rather than silently rescaled.
#[test]
fn read_length_disagreement_keeps_each_segments_own_length() {
    let record =
        assemble("readB\t0\tchr1\t100\t60\t50M\t*\t0\t0\t*\t*\tSA:Z:chr1,900,+,100M,60,0;");
    assert_eq!(record.segments[0].read_length, 100);
    assert_eq!(record.segments[1].read_length, 50);
}

/// A bad position, a bad strand and a truncated entry are each dropped
/// without taking the parseable entries down with them.
#[test]
fn unusable_sa_entries_are_dropped_without_losing_the_rest() {
    let record = assemble(
        "readC\t0\tchr1\t100\t60\t30M\t*\t0\t0\t*\t*\t\
         SA:Z:chr2,500,+,30M,55,0;chr3,abc,+,10M,9,0;chr4,700,?,10M,9,0;chr5,12",
    );
    assert_eq!(record.segments.len(), 2);
    assert_eq!(record.segments[0].chrom, "chr2");
    assert_eq!(record.segments[1].chrom, "chr1");
}

#[test]
fn haplotype_tag_rides_along() {
    let record = assemble("readH\t0\tchr1\t100\t60\t100M\t*\t0\t0\t*\t*\tHP:i:2");
    assert_eq!(record.haplotype, Some(Haplotype::Haplotype2));
}

// ── paired-end gluing ───────────────────────────────────────────────────

#[test]
fn mates_glue_outside_in_by_default() {
    let first = assemble("pairA\t65\tchr1\t1000\t60\t100M\t*\t0\t0\t*\t*");
    let second = assemble("pairA\t129\tchr1\t2000\t60\t80M\t*\t0\t0\t*\t*");

    let (records, paired) = pair_up(vec![first, second], &PairParams::default());
    assert!(paired);
    assert_eq!(records.len(), 1);

    let pair = &records[0];
    assert_eq!(pair.raw_type, RawType::PairedEnd);
    assert_eq!(pair.segments.len(), 2);
    // shared axis: 100 + 20 spacing + 80
    assert!(pair.segments.iter().all(|segment| segment.read_length == 200));
    // the first mate keeps its coordinates
    assert_eq!(pair.segments[0].query_start, 0);
    assert_eq!(pair.segments[0].query_end, 100);
    // the second mate is mirrored across the shared axis
    assert_eq!(pair.segments[1].query_start, 200);
    assert_eq!(pair.segments[1].query_end, 120);
    assert_eq!(pair.segments[1].query_min(), 120);
    assert_eq!(pair.segments[1].query_max(), 200);

    let link = pair.pair_link.as_ref().expect("pair should carry a link");
    assert_eq!(link.rightward.chrom.as_deref(), Some("chr1"));
    assert_eq!(link.rightward.from, Some(1100));
    assert_eq!(link.rightward.to, Some(2000));
    assert_eq!(link.leftward.to, Some(1000));
    assert_eq!(link.leftward.from, Some(2080));
    assert_eq!(link.diff, Some(900));
}

/// Mirroring applies to every path vertex, not just the endpoints.
#[test]
fn flip_maps_every_vertex_across_the_axis() {
    let first = assemble("pairH\t65\tchr1\t1000\t60\t100M\t*\t0\t0\t*\t*");
    let second = assemble("pairH\t129\tchr1\t2000\t60\t10M100D70M\t*\t0\t0\t*\t*");
    let (glued, _) = pair_up(vec![first, second], &PairParams::default());

    // original vertices at q = 0, 10, 10, 80 on a 200-long shared axis
    let mirrored: Vec<i64> = glued[0].segments[1].path.iter().map(|point| point.q).collect();
    assert_eq!(mirrored, vec![200, 190, 190, 120]);
}

#[test]
fn shift_mode_keeps_the_second_mate_upright() {
    let first = assemble("pairB\t65\tchr1\t1000\t60\t100M\t*\t0\t0\t*\t*");
    let second = assemble("pairB\t129\tchr1\t2000\t60\t80M\t*\t0\t0\t*\t*");

    let params = PairParams { pair_spacing: 20, flip_second_in_pair: false };
    let pair = synthesize_pair(Some(&first), Some(&second), 100, &params);
    assert_eq!(pair.segments[1].query_start, 120);
    assert_eq!(pair.segments[1].query_end, 200);
}

/// A mate that mapped outside the loaded region is absent from the batch;
/// the batch's most common read length stands in for it on the axis.
#[test]
fn a_missing_mate_still_reserves_axis_room() {
    let records = vec![
        assemble("pairC\t65\tchr1\t1000\t60\t100M\t*\t0\t0\t*\t*"),
        assemble("pairC\t129\tchr1\t3000\t60\t100M\t*\t0\t0\t*\t*"),
        assemble("pairD\t65\tchr2\t5000\t60\t80M\t*\t0\t0\t*\t*"),
    ];

    let (glued, paired) = pair_up(records, &PairParams::default());
    assert!(paired);
    assert_eq!(glued.len(), 2);

    let lone = &glued[1];
    assert_eq!(lone.read_name, "pairD");
    assert_eq!(lone.segments.len(), 1);
    assert_eq!(lone.segments[0].read_length, 80 + 20 + 100);

    let link = lone.pair_link.as_ref().expect("pair should carry a link");
    assert_eq!(link.rightward.from, Some(5080));
    assert_eq!(link.rightward.to, None);
    assert_eq!(link.diff, None);
}

#[test]
fn paired_records_without_a_mate_bit_are_dropped() {
    let records = vec![
        assemble("pairE\t65\tchr1\t1000\t60\t100M\t*\t0\t0\t*\t*"),
        assemble("odd\t1\tchr1\t2000\t60\t100M\t*\t0\t0\t*\t*"),
    ];
    let (glued, paired) = pair_up(records, &PairParams::default());
    assert!(paired);
    assert_eq!(glued.len(), 1);
    assert_eq!(glued[0].read_name, "pairE");
}

#[test]
fn a_contested_mate_slot_goes_to_the_last_record() {
    let records = vec![
        assemble("pairF\t65\tchr1\t1000\t60\t100M\t*\t0\t0\t*\t*"),
        assemble("pairF\t65\tchr2\t9000\t60\t100M\t*\t0\t0\t*\t*"),
    ];
    let (glued, _) = pair_up(records, &PairParams::default());
    assert_eq!(glued.len(), 1);
    assert_eq!(glued[0].segments.len(), 1);
    assert_eq!(glued[0].segments[0].chrom, "chr2");
}

/// Re-decoding a glued pair re-decodes each mate and rebuilds the axis, so
/// indels appear and disappear with the threshold while the glue holds.
#[test]
fn redecoding_a_pair_rebuilds_the_shared_axis() {
    let first = assemble("pairG\t65\tchr1\t1000\t60\t50M100D50M\t*\t0\t0\t*\t*");
    let second = assemble("pairG\t129\tchr1\t4000\t60\t100M\t*\t0\t0\t*\t*");
    let (glued, _) = pair_up(vec![first, second], &PairParams::default());

    let pair = &glued[0];
    assert_eq!(pair.segments[0].path.len(), 4);

    let coarse = pair.redecode(&DecodeParams { min_indel_size: -1 }, &PairParams::default());
    assert_eq!(coarse.raw_type, RawType::PairedEnd);
    assert_eq!(coarse.segments[0].path.len(), 2);
    assert!(coarse.segments.iter().all(|segment| segment.read_length == 220));
    assert_eq!(coarse.pair_link.as_ref().and_then(|link| link.diff), Some(2800));
}

// ── unpaired deduplication ──────────────────────────────────────────────

#[test]
fn an_unpaired_batch_passes_through_untouched() {
    let records = vec![
        assemble("readU\t0\tchr1\t100\t60\t100M\t*\t0\t0\t*\t*"),
        assemble("readV\t0\tchr2\t200\t60\t100M\t*\t0\t0\t*\t*"),
    ];
    let (kept, paired) = pair_up(records, &PairParams::default());
    assert!(!paired);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].raw_type, RawType::Single);
}

/// Aligners that emit one record per alignment with no SA tag still produce
/// one merged record per read, with the tag text rebuilt to match.
#[test]
fn repeated_primaries_merge_into_one_split_record() {
    let records = vec![
        assemble("multi\t0\tchr1\t100\t60\t60M40S\t*\t0\t0\t*\t*"),
        assemble("multi\t16\tchr2\t500\t40\t60S40M\t*\t0\t0\t*\t*"),
    ];
    let (kept, paired) = pair_up(records, &PairParams::default());
    assert!(!paired);
    assert_eq!(kept.len(), 1);

    let merged = &kept[0];
    assert_eq!(merged.raw_type, RawType::SplitAssembled);
    assert_eq!(merged.segments.len(), 2);
    assert_eq!(merged.segments[1].chrom, "chr2");
    assert_eq!(merged.primary_index, 0);
    assert_eq!(merged.sa.as_deref(), Some("chr2,500,-,60S40M,40,0"));
}

#[test]
fn a_duplicate_on_a_known_chromosome_is_skipped() {
    let records = vec![
        assemble("multi\t0\tchr1\t100\t60\t60M\t*\t0\t0\t*\t*"),
        assemble("multi\t0\tchr1\t900\t60\t60M\t*\t0\t0\t*\t*"),
    ];
    let (kept, _) = pair_up(records, &PairParams::default());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].segments.len(), 1);
    assert_eq!(kept[0].raw_type, RawType::Single);
    assert!(kept[0].sa.is_none());
}

#[test]
fn a_longer_duplicate_takes_over_the_longest_slot() {
    let records = vec![
        assemble("multi\t0\tchr1\t100\t60\t40M\t*\t0\t0\t*\t*"),
        assemble("multi\t0\tchr2\t500\t60\t90M\t*\t0\t0\t*\t*"),
    ];
    let (kept, _) = pair_up(records, &PairParams::default());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].longest_index, 1);
    assert_eq!(kept[0].segments[1].aligned_length, 90);
}

// ── coordinate-table input ──────────────────────────────────────────────

#[test]
fn coords_rows_group_by_query_name() {
    let lines = [
        "1000\t2000\t1\t1001\t1000\t1000\t95.5\t50000\t3000\ttig1\tqueryA",
        "2500\t3000\t1200\t1700\t500\t500\t88.0\t50000\t3000\ttig1\tqueryA",
        "100\t600\t1\t501\t500\t500\t99.0\t50000\t800\ttig2\tqueryB",
    ];
    let rows = lines.iter().map(|line| {
        parse_coords_line(line).expect("row should parse").expect("row should not be padding")
    });

    let mut engine = LayoutEngine::new(
        DecodeParams::region_view(),
        PairParams::default(),
        LayoutParams::default(),
    );
    engine.ingest_coords(rows);

    let records = engine.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].read_name, "queryA");
    assert_eq!(records[0].raw_type, RawType::SplitAssembled);
    assert_eq!(records[0].segments.len(), 2);
    assert_eq!(records[0].segments[0].aligned_length, 1000);
    assert!(records[0].segments[0].max_indel_size.is_none());
    assert_eq!(records[1].read_name, "queryB");
    assert_eq!(records[1].raw_type, RawType::Single);
}

#[test]
fn wrong_column_count_names_the_expected_layout() {
    let error = parse_coords_line("100 200 1 101 100").expect_err("5 columns should fail");
    assert!(error.to_string().contains("expected 11"));
    assert!(parse_coords_line("====").expect("padding is tolerated").is_none());
}
