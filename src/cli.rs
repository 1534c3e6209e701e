use crate::coord::Region;
use crate::engine::SortReadsBy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "splitweave-rs",
    about = "Reconcile split and paired alignments onto a compact virtual coordinate axis",
    version
)]
pub struct Args {
    /// Input SAM file, or an 11-column coordinate table with --coords
    pub input: PathBuf,

    /// Output segment table path (defaults to stdout)
    #[arg(short = 'o', long = "out", value_name = "TSV")]
    pub out: Option<PathBuf>,

    /// Treat the input as a coordinate table instead of SAM
    #[arg(long)]
    pub coords: bool,

    /// Region the batch was loaded around, kept in the layout even when
    /// nothing aligns there
    #[arg(short = 'r', long = "region", value_name = "CHROM:START-END")]
    pub region: Option<Region>,

    /// Extra region kept visible, padded by 1 kb on each side (repeatable)
    #[arg(long = "focus", value_name = "CHROM:START-END")]
    pub focus: Vec<Region>,

    /// Smallest insertion or deletion that splits the alignment path;
    /// -1 renders every alignment as a straight segment
    #[arg(long, default_value_t = 50, allow_hyphen_values = true)]
    pub min_indel_size: i64,

    /// Merge intervals separated by fewer than this many bases
    #[arg(long, default_value_t = 10_000)]
    pub merge_margin: i64,

    /// Gap placed between mates when gluing a pair onto one read axis
    #[arg(long, default_value_t = 20)]
    pub pair_spacing: i64,

    /// Keep the second mate's reported orientation instead of mirroring it
    #[arg(long)]
    pub no_flip_second: bool,

    /// Collapse a chromosome to a single interval once footprints cover
    /// this fraction of it
    #[arg(long, default_value_t = 0.3)]
    pub whole_ref_fraction: f64,

    /// Hide intervals backed by fewer alignments than this
    #[arg(long, default_value_t = 1)]
    pub min_alignments: i64,

    /// Keep references whose size the header does not declare
    #[arg(long)]
    pub show_unknown_refs: bool,

    /// Hide this chromosome from the layout (repeatable)
    #[arg(long = "hide", value_name = "CHROM")]
    pub hide: Vec<String>,

    /// Also write the consolidated interval table here
    #[arg(long = "intervals-out", value_name = "TSV")]
    pub intervals_out: Option<PathBuf>,

    /// Row order of the segment table
    #[arg(long = "sort", value_enum, default_value = "input")]
    pub sort: SortOrderArg,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Read orderings selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrderArg {
    /// Input order
    Input,
    /// Natural sort on read name
    Name,
    /// Alignments per read, fewest first
    Alignments,
    /// Virtual position of the longest alignment
    Longest,
    /// Virtual position of the primary alignment
    Primary,
    /// Haplotype tag, untagged reads last
    Haplotype,
}

impl From<SortOrderArg> for SortReadsBy {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::Input => SortReadsBy::InputOrder,
            SortOrderArg::Name => SortReadsBy::ReadName,
            SortOrderArg::Alignments => SortReadsBy::AlignmentCount,
            SortOrderArg::Longest => SortReadsBy::LongestPosition,
            SortOrderArg::Primary => SortReadsBy::PrimaryPosition,
            SortOrderArg::Haplotype => SortReadsBy::Haplotype,
        }
    }
}
