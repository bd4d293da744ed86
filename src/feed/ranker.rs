use super::parser::RideStatus;
use std::cmp::Ordering;

/// Display order: open rides first, then shortest wait first.
fn compare(a: &RideStatus, b: &RideStatus) -> Ordering {
    b.is_open
        .cmp(&a.is_open)
        .then_with(|| a.wait_minutes.cmp(&b.wait_minutes))
}

/// Order rides for display.
///
/// The sort is stable: rides equal on both keys keep their feed order, which
/// still reflects the land grouping the parser produced.
pub fn rank(mut entries: Vec<RideStatus>) -> Vec<RideStatus> {
    entries.sort_by(compare);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ride(name: &str, wait_minutes: u32, is_open: bool) -> RideStatus {
        RideStatus {
            name: name.to_string(),
            wait_minutes,
            is_open,
        }
    }

    #[test]
    fn test_open_before_closed_then_shortest_wait() {
        let ranked = rank(vec![
            ride("A", 30, true),
            ride("B", 5, true),
            ride("C", 0, false),
        ]);
        assert_eq!(
            ranked,
            vec![ride("B", 5, true), ride("A", 30, true), ride("C", 0, false)]
        );
    }

    #[test]
    fn test_closed_rides_sorted_by_wait_too() {
        let ranked = rank(vec![
            ride("Late", 40, false),
            ride("Early", 10, false),
            ride("Open", 90, true),
        ]);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Open", "Early", "Late"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(vec![
            ride("first", 10, true),
            ride("second", 10, true),
            ride("third", 10, true),
        ]);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(Vec::new()).is_empty());
    }

    fn arb_ride() -> impl Strategy<Value = (u32, bool)> {
        (0u32..6, any::<bool>())
    }

    proptest! {
        #[test]
        fn prop_ranking_is_ordered_and_stable(rides in prop::collection::vec(arb_ride(), 0..40)) {
            // Tag each ride with its input position so stability is observable
            let input: Vec<RideStatus> = rides
                .iter()
                .enumerate()
                .map(|(i, (wait, open))| ride(&i.to_string(), *wait, *open))
                .collect();

            let ranked = rank(input.clone());
            prop_assert_eq!(ranked.len(), input.len());

            for pair in ranked.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                let pos_a: usize = a.name.parse().unwrap();
                let pos_b: usize = b.name.parse().unwrap();
                let ordered = (a.is_open && !b.is_open)
                    || (a.is_open == b.is_open && a.wait_minutes < b.wait_minutes)
                    || (a.is_open == b.is_open && a.wait_minutes == b.wait_minutes && pos_a < pos_b);
                prop_assert!(ordered, "out of order: {:?} then {:?}", a, b);
            }
        }
    }
}
