use proptest::prelude::*;
use tasksync_core::store::merge;
use tasksync_core::ProjectStore;
use tasksync_model::{MutationEvent, Priority, Project, ProjectId, Task, TaskId, UserId};
use tasksync_test_utils::{date, task};

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
}

fn arb_task(project: &'static str) -> impl Strategy<Value = Task> {
    ("t[0-9]", "[a-z ]{1,12}", arb_priority(), any::<bool>()).prop_map(
        move |(id, name, priority, completed)| {
            Task::new(TaskId::new(id), ProjectId::from(project), name, priority, date())
                .with_completed(completed)
        },
    )
}

fn arb_event(project: &'static str) -> impl Strategy<Value = MutationEvent> {
    arb_task(project).prop_flat_map(|task| {
        prop_oneof![
            Just(MutationEvent::TaskCreated(task.clone())),
            Just(MutationEvent::TaskUpdated(task.clone())),
            Just(MutationEvent::TaskDeleted(task.clone())),
            Just(MutationEvent::TaskStatusChanged(task)),
        ]
    })
}

fn base() -> Project {
    Project::new(ProjectId::from("p1"), "Site", UserId::from("u1"))
        .with_tasks(vec![task("t1", "p1"), task("t2", "p1")])
}

fn has_unique_ids(project: &Project) -> bool {
    let mut ids: Vec<_> = project.tasks.iter().map(|t| t.id.clone()).collect();
    ids.sort();
    ids.dedup();
    ids.len() == project.tasks.len()
}

#[test]
fn test_created_twice_adds_once() {
    let store = ProjectStore::new();
    store.replace_project(base());
    let event = MutationEvent::TaskCreated(task("t3", "p1"));

    assert!(store.apply(&event));
    assert!(!store.apply(&event));
    assert_eq!(store.project().unwrap().tasks.len(), 3);
}

proptest! {
    #[test]
    fn prop_applying_twice_equals_applying_once(event in arb_event("p1")) {
        let once = merge::apply_event(&base(), &event).unwrap_or_else(base);
        let twice = merge::apply_event(&once, &event).unwrap_or_else(|| once.clone());

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_other_project_events_never_change_state(
        events in prop::collection::vec(arb_event("p2"), 1..20)
    ) {
        let start = base();
        for event in &events {
            prop_assert!(merge::apply_event(&start, event).is_none());
        }
    }

    #[test]
    fn prop_task_ids_stay_unique(events in prop::collection::vec(arb_event("p1"), 0..40)) {
        let store = ProjectStore::new();
        store.replace_project(base());
        for event in &events {
            store.apply(event);
        }

        let project = store.project().unwrap();
        prop_assert!(has_unique_ids(&project));
        prop_assert!(project.tasks.iter().all(|t| t.project == ProjectId::from("p1")));
    }

    #[test]
    fn prop_store_matches_pure_fold(events in prop::collection::vec(arb_event("p1"), 0..40)) {
        let store = ProjectStore::new();
        store.replace_project(base());
        let mut expected = base();
        for event in &events {
            store.apply(event);
            if let Some(next) = merge::apply_event(&expected, event) {
                expected = next;
            }
        }

        prop_assert_eq!(&*store.project().unwrap(), &expected);
    }
}
