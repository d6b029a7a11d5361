use chrono::NaiveDate;
use lazytask_core::{Priority, Recurrence, Task, TaskStatus, TaskValidationError};
use uuid::Uuid;

fn due() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

#[test]
fn task_new_sets_defaults() {
    let task = Task::new("  water plants ", due());

    assert!(!task.id.is_nil());
    assert_eq!(task.title, "water plants");
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.recurrence, Recurrence::None);
    assert_eq!(task.status, TaskStatus::Active);
    assert_eq!(task.last_notified_at, None);
    assert!(task.participates_in_calendar());
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut task = Task::with_id(id, "standup", due()).unwrap();
    task.priority = Priority::High;
    task.category = Some("work".to_string());
    task.recurrence = Recurrence::Weekly {
        interval: 2,
        weekdays: vec![1, 3],
    };
    task.status = TaskStatus::Paused;

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["due_date"], "2024-01-15T09:00:00");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["status"], "paused");
    assert_eq!(json["recurrence"]["kind"], "weekly");
    assert_eq!(json["recurrence"]["interval"], 2);
    assert_eq!(json["recurrence"]["weekdays"], serde_json::json!([1, 3]));

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn deserialize_fills_optional_fields() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "legacy",
        "due_date": "2024-01-15T09:00:00"
    });

    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.recurrence, Recurrence::None);
    assert_eq!(task.status, TaskStatus::Active);
    assert_eq!(task.created_at, due());
}

#[test]
fn deserialize_rejects_malformed_recurrence() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "bad",
        "due_date": "2024-01-15T09:00:00",
        "recurrence": { "kind": "monthly", "interval": 1, "day": 31 }
    });

    let err = serde_json::from_value::<Task>(value).unwrap_err();
    assert!(
        err.to_string().contains("month day 31 is out of range"),
        "unexpected error: {err}"
    );
}

#[test]
fn deserialize_rejects_unknown_recurrence_kind() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "bad",
        "due_date": "2024-01-15T09:00:00",
        "recurrence": { "kind": "yearly", "interval": 1 }
    });

    assert!(serde_json::from_value::<Task>(value).is_err());
}

#[test]
fn with_id_rejects_nil_uuid_and_blank_title() {
    assert_eq!(
        Task::with_id(Uuid::nil(), "x", due()).unwrap_err(),
        TaskValidationError::NilId
    );
    assert_eq!(
        Task::with_id(Uuid::new_v4(), "   ", due()).unwrap_err(),
        TaskValidationError::EmptyTitle
    );
}
