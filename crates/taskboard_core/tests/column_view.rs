use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use taskboard_core::{column_view, IndexOutOfRange, SortMode, Task, TaskStatus};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn task(id: &str, status: TaskStatus, title: &str, minutes: i64) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        status,
        created_at: at(minutes),
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn mixed_board() -> Vec<Task> {
    vec![
        task("1", TaskStatus::Todo, "Draft Plan", 10),
        task("2", TaskStatus::Done, "Plan review", 20),
        task("3", TaskStatus::Todo, "Buy milk", 30),
        task("4", TaskStatus::InProgress, "Deploy", 5),
        task("5", TaskStatus::Todo, "plan retro", 30),
        task("6", TaskStatus::Todo, "Archive", 0),
    ]
}

#[test]
fn every_task_appears_in_exactly_its_own_column() {
    let tasks = mixed_board();
    for task in &tasks {
        for status in TaskStatus::ALL {
            let view = column_view(&tasks, status, "", SortMode::Recent, utc());
            let present = view.ids().contains(&task.id.as_str());
            assert_eq!(present, status == task.status, "task {} in {status}", task.id);
            assert!(view.entries.iter().all(|entry| entry.task.status == status));
        }
    }
}

#[test]
fn search_keeps_only_case_insensitive_title_matches() {
    let tasks = mixed_board();
    let view = column_view(&tasks, TaskStatus::Todo, "PLAN", SortMode::Oldest, utc());
    assert_eq!(view.ids(), vec!["1", "5"]);

    let view = column_view(&tasks, TaskStatus::Todo, "nothing", SortMode::Recent, utc());
    assert!(view.is_empty());
}

#[test]
fn recent_and_oldest_orders_are_stable_for_equal_timestamps() {
    let tasks = mixed_board();

    let recent = column_view(&tasks, TaskStatus::Todo, "", SortMode::Recent, utc());
    assert_eq!(recent.ids(), vec!["3", "5", "1", "6"]);
    assert!(recent
        .entries
        .windows(2)
        .all(|pair| pair[0].task.created_at >= pair[1].task.created_at));

    let oldest = column_view(&tasks, TaskStatus::Todo, "", SortMode::Oldest, utc());
    assert_eq!(oldest.ids(), vec!["6", "1", "3", "5"]);
    assert!(oldest
        .entries
        .windows(2)
        .all(|pair| pair[0].task.created_at <= pair[1].task.created_at));
}

#[test]
fn building_a_view_leaves_the_collection_untouched() {
    let tasks = mixed_board();
    let snapshot = tasks.clone();
    let view = column_view(&tasks, TaskStatus::Todo, "", SortMode::Recent, utc());

    assert_eq!(tasks, snapshot);
    assert_eq!(view.entries[0].task, tasks[2]);
    assert_eq!(view.entries[0].created_display, "1/3/2026, 9:30:00 am");
}

#[test]
fn reorder_moves_one_card_and_shifts_the_rest() {
    let tasks = mixed_board();
    let mut view = column_view(&tasks, TaskStatus::Todo, "", SortMode::Recent, utc());

    view.reorder(0, 2).unwrap();
    assert_eq!(view.ids(), vec!["5", "1", "3", "6"]);

    view.reorder(3, 0).unwrap();
    assert_eq!(view.ids(), vec!["6", "5", "1", "3"]);

    view.reorder(1, 1).unwrap();
    assert_eq!(view.ids(), vec!["6", "5", "1", "3"]);
}

#[test]
fn reorder_rejects_out_of_range_indices() {
    let tasks = mixed_board();
    let mut view = column_view(&tasks, TaskStatus::Todo, "", SortMode::Recent, utc());
    let before = view.clone();

    let err = view.reorder(0, 4).unwrap_err();
    assert_eq!(err, IndexOutOfRange { index: 4, len: 4 });
    assert_eq!(view, before);
}
