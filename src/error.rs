use thiserror::Error;

/// Per-record failures raised while ingesting alignment input.
///
/// None of these abort a batch. Call sites branch on the variant: wildcard
/// CIGARs are skipped silently, everything else drops the offending unit with
/// a warning and the batch continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// CIGAR text did not fully tokenize as `(\d+<op>)+`.
    #[error("malformed CIGAR string '{cigar}'")]
    MalformedCigar { cigar: String },

    /// CIGAR was `*` or empty. Normal for unmapped-but-listed reads.
    #[error("empty or wildcard CIGAR")]
    EmptyOrWildcardCigar,

    /// An SA-tag entry could not be decoded into an alignment.
    #[error("bad SA entry '{entry}': {reason}")]
    MalformedSaEntry { entry: String, reason: String },

    /// Segments of one read disagree on the total read length implied by
    /// their CIGAR strings.
    #[error(
        "read '{read}': supplementary alignment read length {got} \
         does not match primary read length {expected}"
    )]
    ReadLengthMismatch { read: String, expected: i64, got: i64 },

    /// A record in a paired-end batch carried neither the first-in-pair nor
    /// the second-in-pair flag bit.
    #[error("read '{read}': paired flag set but neither first- nor second-in-pair bit")]
    UnrecognizedPairFlag { read: String },

    /// A SAM record line was too short or had non-numeric required fields.
    #[error("malformed record line: {reason}")]
    MalformedRecordLine { reason: String },

    /// A coordinate row did not have the 11 expected columns.
    #[error(
        "coordinate row: {reason}; expected 11 whitespace-separated columns: \
         ref_start, ref_end, query_start, query_end, ref_align_len, \
         query_align_len, percent_identity, ref_total_len, query_total_len, \
         ref_name, query_name"
    )]
    MalformedCoordsRow { reason: String },
}
