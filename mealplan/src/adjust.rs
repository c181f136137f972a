/// Which end of a quantity range the user just edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Min,
    Max,
}

/// Repair an inverted min/max pair by collapsing it onto the edited side.
///
/// Ranges with a missing end, or that are already ordered, come back
/// untouched. When the caller doesn't say which side changed it is inferred
/// from the baseline values, falling back to keeping `min`.
pub fn adjust_range(
    min: Option<u32>,
    max: Option<u32>,
    original_min: Option<u32>,
    original_max: Option<u32>,
    changed: Option<Side>,
) -> (Option<u32>, Option<u32>) {
    let (Some(low), Some(high)) = (min, max) else {
        return (min, max);
    };
    if high >= low {
        return (min, max);
    }
    let changed = changed.unwrap_or_else(|| {
        if original_min.is_some_and(|original| original != low) {
            Side::Min
        } else if original_max.is_some_and(|original| original != high) {
            Side::Max
        } else {
            Side::Min
        }
    });
    match changed {
        Side::Min => (Some(low), Some(low)),
        Side::Max => (Some(high), Some(high)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infers_min_changed() {
        assert_eq!(
            adjust_range(Some(6), Some(4), Some(2), Some(4), None),
            (Some(6), Some(6))
        );
    }

    #[test]
    fn test_infers_max_changed() {
        assert_eq!(
            adjust_range(Some(6), Some(4), Some(6), Some(8), None),
            (Some(4), Some(4))
        );
    }

    #[test]
    fn test_explicit_side_wins() {
        assert_eq!(
            adjust_range(Some(8), Some(5), Some(8), Some(9), Some(Side::Min)),
            (Some(8), Some(8))
        );
        assert_eq!(
            adjust_range(Some(8), Some(5), Some(2), Some(5), Some(Side::Max)),
            (Some(5), Some(5))
        );
    }

    #[test]
    fn test_no_baseline_keeps_min() {
        assert_eq!(adjust_range(Some(8), Some(4), None, None, None), (Some(8), Some(8)));
    }

    #[test]
    fn test_untouched_cases() {
        assert_eq!(adjust_range(Some(2), Some(4), None, None, None), (Some(2), Some(4)));
        assert_eq!(adjust_range(Some(3), None, Some(1), Some(2), None), (Some(3), None));
        assert_eq!(adjust_range(None, Some(3), None, None, Some(Side::Max)), (None, Some(3)));
        assert_eq!(adjust_range(None, None, None, None, None), (None, None));
    }

    #[test]
    fn test_side_parses_from_query_values() {
        assert_eq!("min".parse::<Side>().unwrap(), Side::Min);
        assert_eq!("max".parse::<Side>().unwrap(), Side::Max);
        assert!("".parse::<Side>().is_err());
    }
}
