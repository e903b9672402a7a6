#[cfg(test)]
mod tests {
    use crate::format::{format_utc_millis, normalize_timestamp, parse_timestamp, truncated};
    use chrono::DateTime;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_truncated_shape(
            items in proptest::collection::vec("[a-z]{1,6}", 0..12),
            limit in 1..8usize,
        ) {
            let preview = truncated(&items, limit);

            if items.is_empty() {
                prop_assert_eq!(preview, "");
            } else {
                prop_assert!(preview.starts_with('[') && preview.ends_with(']'));
                prop_assert_eq!(preview.ends_with(", ...]"), items.len() > limit);
                for item in items.iter().take(limit) {
                    prop_assert!(preview.contains(item.as_str()));
                }
            }
        }

        #[test]
        fn test_normalize_timestamp_is_idempotent(micros in 0i64..4_102_444_800_000_000i64) {
            let Some(dt) = DateTime::from_timestamp_micros(micros) else {
                return Ok(());
            };
            let once = normalize_timestamp(&dt.to_rfc3339());
            let twice = normalize_timestamp(&once);
            prop_assert_eq!(&once, &twice);
            // millisecond precision survives the round trip
            let reparsed = parse_timestamp(&once).unwrap();
            prop_assert_eq!(format_utc_millis(reparsed), once);
        }
    }
}
