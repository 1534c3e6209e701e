//! splitweave-rs: reconcile split and paired genomic alignments onto a
//! compact virtual coordinate axis.
//!
//! # Library usage
//!
//! ```no_run
//! use splitweave_rs::{DecodeParams, LayoutEngine, LayoutParams, PairParams};
//! use splitweave_rs::parse_record_line;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut engine = LayoutEngine::new(
//!     DecodeParams::region_view(),
//!     PairParams::default(),
//!     LayoutParams::default(),
//! );
//!
//! // Records come from any SAM source; the SA tag turns one line into a
//! // multi-segment read.
//! let line = "readA\t0\tchr1\t100\t60\t30M10D30M\t*\t0\t0\t*\t*";
//! engine.ingest(vec![parse_record_line(line)?]);
//! engine.organize();
//!
//! let mapper = engine.mapper();
//! let mapped = mapper.map_closest("chr1", 120);
//! println!("virtual position {}", mapped.pos);
//! # Ok(())
//! # }
//! ```

// Internal modules, reachable through the flat re-exports below.
pub(crate) mod cigar;
pub(crate) mod consolidate;
pub(crate) mod coord;
pub(crate) mod coords;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod paired;
pub(crate) mod record;
pub(crate) mod sam;
pub(crate) mod split;
pub(crate) mod types;

// The command-line surface, consumed by the binary.
pub mod cli;
pub mod pipeline;

// Flat re-exports for the most commonly used public types.
pub use cigar::{Cigar, CigarLengths, CigarOp, CigarWalk, DecodeParams, PathPoint, Strand};
pub use consolidate::{EventKind, LayoutParams, Span, consolidate_chrom, planesweep};
pub use coord::{
    CoordinateMapper, Interval, MappedPosition, Precision, Region, WholeReference, chrom_index,
    natural_cmp,
};
pub use coords::{CoordsRow, parse_coords_line, segment_from_row};
pub use engine::{BatchStats, FetchTracker, IngestStats, LayoutEngine, SortReadsBy};
pub use error::RecordError;
pub use paired::{LinkEndpoints, PairLink, PairParams, pair_up, synthesize_pair};
pub use record::{AlignmentSegment, Haplotype, SegmentSource};
pub use sam::{RawAlignment, parse_record_line, parse_sq_line};
pub use split::{RawType, ReadRecord, RecordSource, assemble_record, parse_sa_entries};
