use common::domain::{DomainError, DomainResult};

/// Decide whether a pagination window over `total_count` rows is servable.
///
/// Returns `Ok(false)` when the window is empty but valid — zero limit, zero
/// matching rows, or an offset past the end — so callers serve an empty page
/// alongside the precomputed total. A negative `limit` means no upper bound.
/// A negative `offset` is a contract violation.
pub fn check_count_range(total_count: u64, offset: i64, limit: i64) -> DomainResult<bool> {
    if offset < 0 {
        return Err(DomainError::ValidationError(format!(
            "offset {offset} must be greater than or equal to 0"
        )));
    }
    if limit == 0 || total_count == 0 {
        return Ok(false);
    }
    if offset as u64 >= total_count {
        return Ok(false);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_offset_is_a_contract_violation() {
        let result = check_count_range(10, -1, 5);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn zero_limit_yields_empty_window_without_error() {
        assert!(!check_count_range(10, 0, 0).unwrap());
    }

    #[test]
    fn zero_total_yields_empty_window_without_error() {
        assert!(!check_count_range(0, 0, 5).unwrap());
    }

    #[test]
    fn offset_past_the_end_yields_empty_window_without_error() {
        assert!(!check_count_range(5, 5, 10).unwrap());
        assert!(!check_count_range(5, 100, 10).unwrap());
    }

    #[test]
    fn negative_limit_means_unbounded() {
        assert!(check_count_range(5, 0, -1).unwrap());
        assert!(check_count_range(5, 4, -1).unwrap());
    }

    #[test]
    fn valid_window_is_servable() {
        assert!(check_count_range(10, 0, 5).unwrap());
        assert!(check_count_range(10, 9, 5).unwrap());
    }
}
