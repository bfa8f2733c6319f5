/// Outcome of checking recognized document text against the expected
/// national-ID markers and the caller-supplied ID number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Valid,
    RejectedNotAnId,
    RejectedIdMismatch,
}

/// Phrases expected somewhere in the recognized text of a genuine ID.
const MARKER_PHRASES: [&str; 4] = [
    "republic of kenya",
    "jamhuri ya kenya",
    "national identity card",
    "identity card",
];

/// Decide whether `text` represents a valid national ID matching
/// `claimed_id_number`.
///
/// Checks are ordered: the marker check runs first, so text without any
/// marker phrase is rejected as not-an-ID even if the ID number happens
/// to appear in it. Matching is case-insensitive and literal; OCR noise
/// in either the markers or the number fails the gate.
pub fn validate_document(text: &str, claimed_id_number: &str) -> VerificationOutcome {
    let text = text.to_lowercase();

    if !MARKER_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        return VerificationOutcome::RejectedNotAnId;
    }

    if !text.contains(&claimed_id_number.to_lowercase()) {
        return VerificationOutcome::RejectedIdMismatch;
    }

    VerificationOutcome::Valid
}
