#[cfg(test)]
mod tests {
    use crate::merge::{plan_calendar_events, plan_drive_activities};
    use gactivity_common::{CalendarEventRecord, DriveActivityRecord};
    use proptest::prelude::*;

    fn drive_record() -> impl Strategy<Value = DriveActivityRecord> {
        (
            0i64..100,
            prop::sample::select(vec!["[a@example.com]", "[b@example.com]"]),
            prop::sample::select(vec!["edit", "create", "move"]),
            prop::sample::select(vec!["", "[oldTitle:'x', newTitle:'y']"]),
        )
            .prop_map(|(minute, user, action, result)| DriveActivityRecord {
                activity_id: format!("id-{}", minute),
                time_activity: format!("2024-05-01T10:{:02}:00.000Z", minute % 60),
                user_action: user.to_string(),
                primary_action: action.to_string(),
                sub_action: action.to_string(),
                sub_action_type: String::new(),
                sub_action_result: result.to_string(),
                item: "[driveItem:'Doc']".to_string(),
            })
    }

    fn calendar_record() -> impl Strategy<Value = CalendarEventRecord> {
        (0u32..8, 0u32..3, 0u32..3).prop_map(|(id, created, updated)| CalendarEventRecord {
            event_id: format!("evt-{}", id),
            created_time: format!("2024-05-0{}T08:00:00.000Z", created + 1),
            updated_time: format!("2024-05-1{}T08:00:00.000Z", updated),
            start_time: "2024-05-20T08:00:00.000Z".to_string(),
            end_time: "2024-05-20T09:00:00.000Z".to_string(),
            ..Default::default()
        })
    }

    proptest! {
        #[test]
        fn test_drive_plan_partitions_fresh_records(
            stored in prop::collection::vec(drive_record(), 0..20),
            fresh in prop::collection::vec(drive_record(), 0..20),
        ) {
            let total = fresh.len();
            let plan = plan_drive_activities(&stored, fresh);
            prop_assert_eq!(plan.inserts.len() + plan.duplicates, total);
            prop_assert!(plan.updates.is_empty());
        }

        #[test]
        fn test_drive_plan_is_idempotent(
            stored in prop::collection::vec(drive_record(), 0..20),
            fresh in prop::collection::vec(drive_record(), 0..20),
        ) {
            let first = plan_drive_activities(&stored, fresh.clone());
            let mut stored_after = stored.clone();
            stored_after.extend(first.inserts);

            let second = plan_drive_activities(&stored_after, fresh.clone());
            prop_assert!(second.inserts.is_empty());
            prop_assert_eq!(second.duplicates, fresh.len());
        }

        #[test]
        fn test_calendar_plan_partitions_fresh_records(
            stored in prop::collection::vec(calendar_record(), 0..20),
            fresh in prop::collection::vec(calendar_record(), 0..20),
        ) {
            let total = fresh.len();
            let plan = plan_calendar_events(&stored, fresh);
            prop_assert_eq!(plan.inserts.len() + plan.updates.len() + plan.duplicates, total);
            for update in &plan.updates {
                prop_assert!(stored.iter().any(|s| s.event_id == update.event_id
                    && s.created_time == update.created_time));
            }
            for insert in &plan.inserts {
                prop_assert!(!stored.iter().any(|s| s.event_id == insert.event_id
                    && s.created_time == insert.created_time));
            }
        }
    }
}
