use crate::cigar::Strand;
use crate::error::RecordError;
use crate::record::{Haplotype, SegmentSource};
use noodles::sam::alignment::record::Flags;

/// One alignment line, split into the fields the layout cares about.
///
/// Field text is kept verbatim; interpretation (flag bits, CIGAR decode,
/// supplementary entries) happens downstream so a bad optional tag cannot
/// reject an otherwise usable line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAlignment {
    pub read_name: String,
    pub flag: u16,
    pub chrom: String,
    pub pos: i64,
    pub mapping_quality: i64,
    pub cigar: String,
    pub sa: Option<String>,
    pub hp: Option<String>,
}

impl RawAlignment {
    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.flag)
    }

    pub fn strand(&self) -> Strand {
        if self.flags().is_reverse_complemented() {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    pub fn haplotype(&self) -> Option<Haplotype> {
        self.hp.as_deref().map(Haplotype::from_tag)
    }

    /// The record's own alignment as a segment source.
    pub fn primary_source(&self) -> Result<SegmentSource, RecordError> {
        SegmentSource::from_parts(
            &self.chrom,
            self.pos,
            self.strand(),
            &self.cigar,
            self.mapping_quality as f64,
        )
    }
}

/// Parse one alignment line. Positions are taken as given, with no
/// coordinate-base conversion.
pub fn parse_record_line(line: &str) -> Result<RawAlignment, RecordError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return Err(RecordError::MalformedRecordLine {
            reason: format!("expected at least 6 fields, found {}", fields.len()),
        });
    }

    let flag: u16 = fields[1].parse().map_err(|_| RecordError::MalformedRecordLine {
        reason: format!("invalid FLAG field {:?}", fields[1]),
    })?;
    let pos: i64 = fields[3].parse().map_err(|_| RecordError::MalformedRecordLine {
        reason: format!("invalid POS field {:?}", fields[3]),
    })?;
    let mapping_quality: i64 = fields[4].parse().map_err(|_| RecordError::MalformedRecordLine {
        reason: format!("invalid MAPQ field {:?}", fields[4]),
    })?;

    // Optional tags live from field 11 onward. `splitn` keeps any colon
    // inside the tag value intact.
    let mut sa = None;
    let mut hp = None;
    for field in fields.iter().skip(11) {
        if field.starts_with("SA:") {
            sa = field.splitn(3, ':').nth(2).map(str::to_string);
        } else if field.starts_with("HP:") {
            hp = field.splitn(3, ':').nth(2).map(str::to_string);
        }
    }

    Ok(RawAlignment {
        read_name: fields[0].to_string(),
        flag,
        chrom: fields[2].to_string(),
        pos,
        mapping_quality,
        cigar: fields[5].to_string(),
        sa,
        hp,
    })
}

/// Pull the reference name and length out of an `@SQ` header line.
///
/// Returns `None` for every other header line. A missing or unparsable
/// `LN` field leaves the size unknown rather than rejecting the line.
pub fn parse_sq_line(line: &str) -> Option<(String, Option<i64>)> {
    let rest = line.strip_prefix("@SQ")?;
    let mut name = None;
    let mut size = None;
    for field in rest.split_whitespace() {
        if let Some(value) = field.strip_prefix("SN:") {
            name = Some(value.to_string());
        } else if let Some(value) = field.strip_prefix("LN:") {
            size = value.parse::<i64>().ok();
        }
    }
    Some((name?, size))
}
