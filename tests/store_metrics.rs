use ideaboard::{Idea, IdeaStore, Status};

fn idea(title: &str, status: Status) -> Idea {
    Idea::new(title.into(), format!("About {}", title), vec![]).with_status(status)
}

#[test]
fn metrics_follow_every_mutation() {
    let mut store = IdeaStore::new();
    assert_eq!(store.metrics().total_ideas, 0);

    let draft = idea("draft", Status::Draft);
    let draft_id = draft.id.clone();
    store.add(draft).unwrap();
    store.add(idea("review", Status::Review)).unwrap();
    store.add(idea("ready", Status::Ready)).unwrap();
    store.add(idea("published", Status::Published)).unwrap();

    let metrics = *store.metrics();
    assert_eq!(metrics.total_ideas, 4);
    for status in Status::ALL {
        assert_eq!(metrics.count_for(status), 1, "bucket {}", status);
    }
    assert_eq!(metrics.this_week, 4);
    assert_eq!(metrics.this_month, 4);

    let mut moved = store.get(&draft_id).unwrap().clone();
    moved.status = Status::Published;
    moved.touch();
    assert!(store.update(moved));

    let after = *store.metrics();
    assert_eq!(after.total_ideas, 4);
    assert_eq!(after.drafts, metrics.drafts - 1);
    assert_eq!(after.published, metrics.published + 1);
    assert_eq!(after.in_review, metrics.in_review);
    assert_eq!(after.ready, metrics.ready);
}

#[test]
fn pipeline_columns_keep_store_order() {
    let first = idea("first", Status::Review);
    let second = idea("second", Status::Review);
    let store = IdeaStore::with_ideas(vec![first, idea("other", Status::Draft), second]);

    let column: Vec<&str> = store
        .ideas_by_status(Status::Review)
        .iter()
        .map(|i| i.title.as_str())
        .collect();
    assert_eq!(column, vec!["first", "second"]);
    assert!(store.ideas_by_status(Status::Published).is_empty());
}

#[test]
fn stores_are_independent() {
    let mut one = IdeaStore::new();
    let two = IdeaStore::new();

    one.add(idea("only here", Status::Draft)).unwrap();

    assert_eq!(one.len(), 1);
    assert!(two.is_empty());
}
