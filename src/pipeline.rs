use crate::cigar::DecodeParams;
use crate::cli::Args;
use crate::consolidate::LayoutParams;
use crate::coord::{Interval, Precision};
use crate::coords::{CoordsRow, parse_coords_line};
use crate::engine::LayoutEngine;
use crate::paired::PairParams;
use crate::record::Haplotype;
use crate::sam::{RawAlignment, parse_record_line, parse_sq_line};
use crate::split::RawType;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Default)]
pub struct Stats {
    pub total_records: u64,
    pub malformed_lines: u64,
    pub kept_records: u64,
    pub skipped_unmapped: u64,
    pub dropped_records: u64,
    pub reads: u64,
    pub segments: u64,
    pub intervals: u64,
    pub paired_end: bool,
}

pub fn run(args: &Args) -> Result<Stats> {
    let decode = DecodeParams { min_indel_size: args.min_indel_size };
    let pair = PairParams {
        pair_spacing: args.pair_spacing,
        flip_second_in_pair: !args.no_flip_second,
    };
    let layout = LayoutParams {
        merge_margin: args.merge_margin,
        whole_ref_fraction: args.whole_ref_fraction,
        min_alignments_for_interval: args.min_alignments,
        show_only_known_references: !args.show_unknown_refs,
    };
    let mut engine = LayoutEngine::new(decode, pair, layout);

    let mut stats = Stats::default();
    if args.coords {
        let rows = read_coords(&args.input, &mut stats)?;
        stats.kept_records = rows.len() as u64;
        engine.ingest_coords(rows);
    } else {
        let (sizes, records) = read_sam(&args.input, &mut stats)?;
        engine.set_header_sizes(sizes);
        let ingest = engine.ingest(records);
        stats.kept_records = ingest.kept as u64;
        stats.skipped_unmapped = ingest.skipped_unmapped as u64;
        stats.dropped_records = ingest.dropped as u64;
    }

    if let Some(region) = &args.region {
        match engine.resolve_region(region) {
            Some(resolved) => engine.set_focal_region(Some(resolved)),
            None => tracing::warn!(%region, "region chromosome not found in the input; ignoring"),
        }
    }
    for region in &args.focus {
        match engine.resolve_region(region) {
            Some(resolved) => engine.add_focus_region(resolved),
            None => tracing::warn!(%region, "focus chromosome not found in the input; ignoring"),
        }
    }

    engine.organize();
    if !args.hide.is_empty() {
        let hidden: Vec<&str> = args.hide.iter().map(String::as_str).collect();
        engine.apply_filters(&hidden);
    }
    engine.sort_records(args.sort.into());

    write_segments(&engine, args.out.as_deref())?;
    if let Some(path) = &args.intervals_out {
        write_intervals(engine.intervals(), path)?;
    }

    let batch = engine.batch_stats();
    stats.reads = batch.records as u64;
    stats.segments = batch.segments as u64;
    stats.intervals = engine.intervals().len() as u64;
    stats.paired_end = engine.paired_end_mode();
    Ok(stats)
}

fn read_sam(
    path: &Path,
    stats: &mut Stats,
) -> Result<(Vec<(String, Option<i64>)>, Vec<RawAlignment>)> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut sizes = Vec::new();
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if line.starts_with('@') {
            if let Some(entry) = parse_sq_line(&line) {
                sizes.push(entry);
            }
            continue;
        }
        stats.total_records += 1;
        match parse_record_line(&line) {
            Ok(raw) => records.push(raw),
            Err(error) => {
                tracing::warn!("{error}; skipping line");
                stats.malformed_lines += 1;
            }
        }
    }
    Ok((sizes, records))
}

fn read_coords(path: &Path, stats: &mut Stats) -> Result<Vec<CoordsRow>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match parse_coords_line(&line) {
            Ok(Some(row)) => {
                stats.total_records += 1;
                rows.push(row);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("{error}; skipping row");
                stats.malformed_lines += 1;
            }
        }
    }
    Ok(rows)
}

fn write_segments(engine: &LayoutEngine, out: Option<&Path>) -> Result<()> {
    let mut writer: BufWriter<Box<dyn Write>> = match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            BufWriter::new(Box::new(file))
        }
        None => BufWriter::new(Box::new(std::io::stdout().lock())),
    };

    writeln!(
        writer,
        "read\ttype\thaplotype\tchrom\tref_start\tref_end\tquery_start\tquery_end\t\
         read_length\tmapping_quality\tvirtual_start\tvirtual_end\twhole_pos\tprecision"
    )?;

    let mapper = engine.mapper();
    for &index in engine.order() {
        let Some(record) = engine.record(index) else {
            continue;
        };
        for segment in &record.segments {
            let start = mapper.map_closest(&segment.chrom, segment.ref_start);
            let end = mapper.map_closest(&segment.chrom, segment.ref_end);
            let whole_pos = mapper.map_whole(&segment.chrom, segment.ref_start).unwrap_or(-1);
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                record.read_name,
                type_label(record.raw_type),
                haplotype_label(record.haplotype.as_ref()),
                segment.chrom,
                segment.ref_start,
                segment.ref_end,
                segment.query_start,
                segment.query_end,
                segment.read_length,
                segment.mapping_quality,
                start.pos,
                end.pos,
                whole_pos,
                precision_label(start.precision, end.precision),
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_intervals(intervals: &[Interval], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "chrom\tstart\tend\tsize\tvirtual_offset\talignments")?;
    for interval in intervals {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            interval.chrom,
            interval.start,
            interval.end,
            interval.size,
            interval.cumulative_offset,
            interval.alignment_count,
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn type_label(raw_type: RawType) -> &'static str {
    match raw_type {
        RawType::Single => "single",
        RawType::SplitAssembled => "split",
        RawType::PairedEnd => "paired",
    }
}

fn haplotype_label(haplotype: Option<&Haplotype>) -> &str {
    match haplotype {
        Some(Haplotype::Haplotype1) => "1",
        Some(Haplotype::Haplotype2) => "2",
        Some(Haplotype::Unknown(tag)) => tag.as_str(),
        None => "",
    }
}

fn precision_label(start: Precision, end: Precision) -> &'static str {
    match (start, end) {
        (Precision::None, _) | (_, Precision::None) => "none",
        (Precision::Inexact, _) | (_, Precision::Inexact) => "inexact",
        _ => "exact",
    }
}
