use crate::core::StatusExpectation;

use super::Verdict;

/// Check an HTTP status code against the declared expectation
pub fn evaluate_status(status: u16, expectation: &StatusExpectation) -> Verdict {
    if expectation.contains(status) {
        Verdict::pass()
    } else {
        Verdict::fail(format!(
            "Unexpected status {status} (expected {expectation})"
        ))
    }
}
