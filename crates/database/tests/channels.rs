mod common;

use core_types::NewChannel;

#[tokio::test]
async fn create_is_first_write_wins() {
    let Some(db) = common::setup().await else { return };
    let channels = &db.repo.channels;

    assert!(channels.create(&NewChannel::active(100).with_title("A")).await.unwrap());
    assert!(!channels.create(&NewChannel::active(100).with_title("B")).await.unwrap());

    let stored = channels.get_by_channel_id(100).await.unwrap().unwrap();
    assert_eq!(stored.title.as_deref(), Some("A"));
    assert_eq!(channels.get_all().await.unwrap().len(), 1);

    db.teardown().await;
}

#[tokio::test]
async fn duplicate_create_keeps_cursor_and_activity() {
    let Some(db) = common::setup().await else { return };
    let channels = &db.repo.channels;

    channels.create(&NewChannel::active(7)).await.unwrap();
    channels.update_cursor(7, 500, 12).await.unwrap();
    channels.set_active(7, false).await.unwrap();

    channels.create(&NewChannel::active(7).with_handle("again")).await.unwrap();

    let stored = channels.get_by_channel_id(7).await.unwrap().unwrap();
    assert_eq!(stored.last_processed_message_id, 500);
    assert_eq!(stored.last_sync_cursor, 12);
    assert!(!stored.is_active);
    assert_eq!(stored.handle, None);

    db.teardown().await;
}

#[tokio::test]
async fn cursor_advance_leaves_other_fields_alone() {
    let Some(db) = common::setup().await else { return };
    let channels = &db.repo.channels;

    channels
        .create(&NewChannel::active(42).with_title("news").with_handle("@news"))
        .await
        .unwrap();
    let before = channels.get_by_channel_id(42).await.unwrap().unwrap();
    assert_eq!(before.last_processed_message_id, 0);
    assert_eq!(before.last_sync_cursor, 0);

    channels.update_cursor(42, 42, 99).await.unwrap();

    let after = channels.get_by_channel_id(42).await.unwrap().unwrap();
    assert_eq!(after.last_processed_message_id, 42);
    assert_eq!(after.last_sync_cursor, 99);
    assert_eq!(after.title, before.title);
    assert_eq!(after.handle, before.handle);
    assert_eq!(after.is_active, before.is_active);
    assert_eq!(after.added_at, before.added_at);

    db.teardown().await;
}

#[tokio::test]
async fn unknown_channel_is_absent_not_an_error() {
    let Some(db) = common::setup().await else { return };

    assert!(db.repo.channels.get_by_channel_id(123_456).await.unwrap().is_none());

    db.teardown().await;
}

#[tokio::test]
async fn listings_are_newest_first_and_filter_inactive() {
    let Some(db) = common::setup().await else { return };
    let channels = &db.repo.channels;

    for (id, hour) in [(1, 8), (2, 10), (3, 9)] {
        let mut channel = NewChannel::active(id);
        channel.added_at = Some(common::at(2024, 5, 1, hour, 0));
        channels.create(&channel).await.unwrap();
    }
    channels.set_active(2, false).await.unwrap();

    let all: Vec<i64> = channels.get_all().await.unwrap().iter().map(|c| c.channel_id).collect();
    assert_eq!(all, vec![2, 3, 1]);

    let active: Vec<i64> = channels.get_active().await.unwrap().iter().map(|c| c.channel_id).collect();
    assert_eq!(active, vec![3, 1]);

    db.teardown().await;
}

#[tokio::test]
async fn update_replaces_fields_and_ignores_missing_rows() {
    let Some(db) = common::setup().await else { return };
    let channels = &db.repo.channels;

    channels.create(&NewChannel::active(5).with_title("old")).await.unwrap();
    let mut channel = channels.get_by_channel_id(5).await.unwrap().unwrap();
    channel.title = None;
    channel.handle = Some("@renamed".to_string());
    channel.last_processed_message_id = 10;
    channel.last_sync_cursor = 3;
    channel.is_active = false;
    channels.update(&channel).await.unwrap();

    let stored = channels.get_by_channel_id(5).await.unwrap().unwrap();
    assert_eq!(stored, channel);

    let mut ghost = stored.clone();
    ghost.channel_id = 999;
    channels.update(&ghost).await.unwrap();
    assert!(channels.get_by_channel_id(999).await.unwrap().is_none());

    db.teardown().await;
}

#[tokio::test]
async fn delete_removes_only_the_channel() {
    let Some(db) = common::setup().await else { return };
    let repo = &db.repo;

    repo.channels.create(&NewChannel::active(9)).await.unwrap();
    repo.messages
        .append(&core_types::NewMessage::text(9, 1, "kept", common::at(2024, 5, 1, 12, 0)))
        .await
        .unwrap();

    repo.channels.delete(9).await.unwrap();
    repo.channels.delete(9).await.unwrap();

    assert!(repo.channels.get_by_channel_id(9).await.unwrap().is_none());
    assert_eq!(repo.messages.count_by_channel(9).await.unwrap(), 1);

    db.teardown().await;
}
