//! Value range checks

use super::types::RangeSpec;

/// Check a numeric value against a range descriptor
pub fn check_numeric(range: &RangeSpec, value: i32) -> bool {
    match *range {
        RangeSpec::Any => true,
        RangeSpec::Bounds { low, high } => (low..=high).contains(&value),
        RangeSpec::AllowedValues(values) => values.contains(&value),
        RangeSpec::SubRanges(ranges) => ranges
            .iter()
            .any(|&(low, high)| (low..=high).contains(&value)),
        RangeSpec::None | RangeSpec::Object(_) | RangeSpec::SubAcl(_) => false,
    }
}

/// Check a string length against a range descriptor
pub fn check_length(range: &RangeSpec, length: usize) -> bool {
    let Ok(length) = i32::try_from(length) else {
        return false;
    };
    match *range {
        RangeSpec::Bounds { low, high } => (low..=high).contains(&length),
        RangeSpec::AllowedValues(values) => values.contains(&length),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PORTS: RangeSpec = RangeSpec::Bounds { low: 22, high: 65535 };
    const CURSOR: RangeSpec = RangeSpec::SubRanges(&[(-203, -200), (2001, 2029)]);
    const SIZES: RangeSpec = RangeSpec::AllowedValues(&[4, 16]);

    #[test]
    fn test_bounds_fencepost() {
        assert!(!check_numeric(&PORTS, 21));
        assert!(check_numeric(&PORTS, 22));
        assert!(check_numeric(&PORTS, 65535));
        assert!(!check_numeric(&PORTS, 65536));
    }

    #[test]
    fn test_subranges() {
        assert!(check_numeric(&CURSOR, -200));
        assert!(!check_numeric(&CURSOR, -199));
        assert!(check_numeric(&CURSOR, 2001));
        assert!(!check_numeric(&CURSOR, 2000));
        assert!(!check_numeric(&CURSOR, 0));
    }

    #[test]
    fn test_allowed_lengths() {
        assert!(check_length(&SIZES, 4));
        assert!(check_length(&SIZES, 16));
        assert!(!check_length(&SIZES, 5));
        assert!(!check_numeric(&RangeSpec::None, 0));
    }

    proptest! {
        #[test]
        fn prop_bounds_match_interval(low in -1000i32..1000, span in 0i32..1000, value in -3000i32..3000) {
            let range = RangeSpec::Bounds { low, high: low + span };
            prop_assert_eq!(check_numeric(&range, value), value >= low && value <= low + span);
        }

        #[test]
        fn prop_length_never_negative(len in 0usize..4096) {
            let range = RangeSpec::Bounds { low: 0, high: 1024 };
            prop_assert_eq!(check_length(&range, len), len <= 1024);
        }
    }
}
