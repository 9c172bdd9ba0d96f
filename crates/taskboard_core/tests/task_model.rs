use chrono::{TimeZone, Utc};
use taskboard_core::{Task, TaskDraft, TaskPatch, TaskStatus, TaskValidationError};

fn sample_task() -> Task {
    Task {
        id: "65a1f0c2".to_string(),
        title: "Ship release".to_string(),
        description: "cut the tag".to_string(),
        status: TaskStatus::InProgress,
        created_at: Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap(),
    }
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let json = serde_json::to_value(sample_task()).unwrap();
    assert_eq!(json["id"], "65a1f0c2");
    assert_eq!(json["title"], "Ship release");
    assert_eq!(json["description"], "cut the tag");
    assert_eq!(json["status"], "IN_PROGRESS");
    assert_eq!(json["createdAt"], "2026-02-13T10:00:00Z");
}

#[test]
fn task_deserializes_document_id_and_column_labels() {
    let value = serde_json::json!({
        "_id": "abc123",
        "title": "Legacy record",
        "status": "TO DO",
        "createdAt": "2026-02-13T10:00:00.000Z",
        "__v": 0
    });

    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.id, "abc123");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.description, "");
    assert_eq!(
        task.created_at,
        Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap()
    );
}

#[test]
fn task_deserializes_records_carrying_both_id_keys() {
    let json = r#"{"_id":"doc-1","id":"virtual-1","title":"A","description":"","status":"TODO","createdAt":"2026-02-13T10:00:00.000Z","__v":0}"#;

    let task: Task = serde_json::from_str(json).unwrap();
    assert_eq!(task.id, "virtual-1");

    let tasks: Vec<Task> = serde_json::from_str(&format!("[{json}]")).unwrap();
    assert_eq!(tasks.len(), 1);
}

#[test]
fn deserialize_requires_some_id_key() {
    let value = serde_json::json!({
        "title": "Orphan",
        "status": "DONE",
        "createdAt": "2026-02-13T10:00:00Z"
    });

    let err = serde_json::from_value::<Task>(value).unwrap_err();
    assert!(err.to_string().contains("neither `id` nor `_id`"), "unexpected error: {err}");
}

#[test]
fn deserialize_rejects_unknown_status() {
    let value = serde_json::json!({
        "id": "abc123",
        "title": "Blocked",
        "description": "",
        "status": "BLOCKED",
        "createdAt": "2026-02-13T10:00:00Z"
    });

    let err = serde_json::from_value::<Task>(value).unwrap_err();
    assert!(err.to_string().contains("unknown task status"), "unexpected error: {err}");
}

#[test]
fn validate_rejects_blank_id() {
    let mut task = sample_task();
    task.id = "  ".to_string();
    assert_eq!(task.validate().unwrap_err(), TaskValidationError::BlankId);
}

#[test]
fn draft_becomes_todo_stamped_with_creation_time() {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
    let new_task = TaskDraft::new("Write docs", "for the board").into_new_task(now);

    assert_eq!(new_task.status, TaskStatus::Todo);
    assert_eq!(new_task.created_at, now);

    let json = serde_json::to_value(&new_task).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "title": "Write docs",
            "description": "for the board",
            "status": "TODO",
            "createdAt": "2026-10-19T08:00:00Z"
        })
    );
}

#[test]
fn patch_omits_absent_fields_on_the_wire() {
    let json = serde_json::to_value(TaskPatch::status(TaskStatus::Done)).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "DONE" }));

    let json = serde_json::to_value(TaskPatch::from_draft(TaskDraft::new("t", "d"))).unwrap();
    assert_eq!(json, serde_json::json!({ "title": "t", "description": "d" }));
}

#[test]
fn apply_patch_preserves_unnamed_fields() {
    let original = sample_task();
    let mut task = original.clone();
    task.apply_patch(&TaskPatch {
        title: Some("Renamed".to_string()),
        ..TaskPatch::default()
    });

    assert_eq!(task.title, "Renamed");
    assert_eq!(task.id, original.id);
    assert_eq!(task.description, original.description);
    assert_eq!(task.status, original.status);
    assert_eq!(task.created_at, original.created_at);
}
