/// Integration tests running the splitweave-rs binary end-to-end.
///
/// Each test writes a small SAM or coordinate-table fixture into the system
/// temp directory, runs the binary against it, and checks the emitted TSV
/// line by line.
///
/// To run these tests locally:
///   cargo test --test integration
use std::path::{Path, PathBuf};
use std::process::Command;

// ── helpers ──────────────────────────────────────────────────────────────────

fn splitweave_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_splitweave-rs"))
}

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

/// Run the binary, writing the segment table to `out_path`.
fn run_binary(args: &[&str], out_path: &Path) {
    let status = Command::new(splitweave_bin())
        .args(args)
        .arg("-o")
        .arg(out_path)
        .status()
        .expect("failed to spawn splitweave-rs");
    assert!(status.success(), "splitweave-rs exited with status {status}");
}

fn read_lines(path: &Path) -> Vec<String> {
    let text = std::fs::read_to_string(path).expect("read output");
    text.lines().map(str::to_string).collect()
}

const SPLIT_SAM: &str = "\
@SQ\tSN:chr1\tLN:10000
@SQ\tSN:chr2\tLN:20000
readA\t0\tchr1\t100\t60\t50M50S\t*\t0\t0\t*\t*\tSA:Z:chr2,500,-,50S50M,30,1;
readB\t0\tchr1\t300\t55\t100M\t*\t0\t0\t*\t*
";

const SEGMENT_HEADER: &str = "read\ttype\thaplotype\tchrom\tref_start\tref_end\t\
                              query_start\tquery_end\tread_length\tmapping_quality\t\
                              virtual_start\tvirtual_end\twhole_pos\tprecision";

// ── tests ─────────────────────────────────────────────────────────────────────

/// A split read and a plain read produce one row per segment, each placed on
/// the virtual axis and on the whole-genome scale.
#[test]
fn sam_segments_land_on_the_virtual_axis() {
    let input = write_fixture("splitweave_rs_test_split.sam", SPLIT_SAM);
    let out_path = std::env::temp_dir().join("splitweave_rs_test_split.tsv");

    run_binary(&[input.to_str().unwrap(), "-q"], &out_path);

    let lines = read_lines(&out_path);
    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&out_path);

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], SEGMENT_HEADER);
    // the SA segment comes first, the primary second
    assert_eq!(lines[1], "readA\tsplit\t\tchr2\t500\t550\t50\t0\t100\t30\t300\t350\t10500\texact");
    assert_eq!(lines[2], "readA\tsplit\t\tchr1\t100\t150\t0\t50\t100\t60\t0\t50\t100\texact");
    assert_eq!(lines[3], "readB\tsingle\t\tchr1\t300\t400\t0\t100\t100\t55\t200\t300\t300\texact");
}

/// The optional interval table lists each consolidated interval with its
/// virtual offset and alignment count.
#[test]
fn interval_table_reports_the_layout() {
    let input = write_fixture("splitweave_rs_test_intervals.sam", SPLIT_SAM);
    let out_path = std::env::temp_dir().join("splitweave_rs_test_intervals.tsv");
    let intervals_path = std::env::temp_dir().join("splitweave_rs_test_intervals_table.tsv");

    run_binary(
        &[
            input.to_str().unwrap(),
            "--intervals-out",
            intervals_path.to_str().unwrap(),
            "-q",
        ],
        &out_path,
    );

    let lines = read_lines(&intervals_path);
    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&out_path);
    let _ = std::fs::remove_file(&intervals_path);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "chrom\tstart\tend\tsize\tvirtual_offset\talignments");
    assert_eq!(lines[1], "chr1\t100\t400\t300\t0\t2");
    assert_eq!(lines[2], "chr2\t500\t550\t50\t300\t1");
}

/// An 11-column coordinate table drives the same layout pipeline, with
/// percent identity standing in for mapping quality and separator padding
/// skipped silently.
#[test]
fn coords_table_drives_the_same_pipeline() {
    let input = write_fixture(
        "splitweave_rs_test_coords.tsv",
        "=====\n\
         1000\t2000\t1\t1001\t1000\t1000\t95.5\t50000\t3000\ttig1\tqueryA\n\
         2500\t3000\t1200\t1700\t500\t500\t88.0\t50000\t3000\ttig1\tqueryA\n",
    );
    let out_path = std::env::temp_dir().join("splitweave_rs_test_coords_out.tsv");

    run_binary(&[input.to_str().unwrap(), "--coords", "-q"], &out_path);

    let lines = read_lines(&out_path);
    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&out_path);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], SEGMENT_HEADER);
    assert_eq!(lines[1], "queryA\tsplit\t\ttig1\t1000\t2000\t1\t1001\t3000\t95.5\t0\t1000\t1000\texact");
    assert_eq!(lines[2], "queryA\tsplit\t\ttig1\t2500\t3000\t1200\t1700\t3000\t88\t1500\t2000\t2500\texact");
}

/// Hiding a chromosome removes it from both scales; its segments report the
/// sentinel whole position and no usable precision.
#[test]
fn hidden_chromosomes_fall_off_the_axis() {
    let input = write_fixture("splitweave_rs_test_hide.sam", SPLIT_SAM);
    let out_path = std::env::temp_dir().join("splitweave_rs_test_hide.tsv");

    run_binary(&[input.to_str().unwrap(), "--hide", "chr2", "-q"], &out_path);

    let lines = read_lines(&out_path);
    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&out_path);

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "readA\tsplit\t\tchr2\t500\t550\t50\t0\t100\t30\t0\t0\t-1\tnone");
    assert_eq!(lines[2], "readA\tsplit\t\tchr1\t100\t150\t0\t50\t100\t60\t0\t50\t100\texact");
    assert_eq!(lines[3], "readB\tsingle\t\tchr1\t300\t400\t0\t100\t100\t55\t200\t300\t300\texact");
}
