mod common;

use core_types::{AlertLevel, NewTrigger};

fn trigger(phrase: &str, is_regex: bool, level: AlertLevel) -> NewTrigger {
    NewTrigger {
        phrase: phrase.to_string(),
        is_regex,
        alert_level: level.to_string(),
    }
}

#[tokio::test]
async fn trigger_crud_round_trip() {
    let Some(db) = common::setup().await else { return };
    let triggers = &db.repo.triggers;

    let outage = triggers.create(&trigger("outage", false, AlertLevel::Warning)).await.unwrap();
    let pattern = triggers
        .create(&trigger(r"evacuat(e|ion)", true, AlertLevel::Critical))
        .await
        .unwrap();
    assert!(pattern.id > outage.id);
    assert_eq!(pattern.alert_level, "critical");

    let all = triggers.get_all().await.unwrap();
    assert_eq!(all, vec![outage.clone(), pattern.clone()]);

    let mut edited = outage.clone();
    edited.phrase = "blackout".to_string();
    edited.alert_level = AlertLevel::Info.to_string();
    triggers.update(&edited).await.unwrap();
    assert_eq!(triggers.get_by_id(outage.id).await.unwrap(), Some(edited));

    triggers.delete(outage.id).await.unwrap();
    assert!(triggers.get_by_id(outage.id).await.unwrap().is_none());
    assert_eq!(triggers.get_all().await.unwrap(), vec![pattern]);

    db.teardown().await;
}

#[tokio::test]
async fn session_blobs_are_replaced_whole() {
    let Some(db) = common::setup().await else { return };
    let sessions = &db.repo.sessions;

    assert!(sessions.load("primary").await.unwrap().is_none());

    sessions.save("primary", &[1, 2, 3, 4]).await.unwrap();
    sessions.save("primary", &[9]).await.unwrap();
    assert_eq!(sessions.load("primary").await.unwrap(), Some(vec![9]));

    sessions.save("empty", &[]).await.unwrap();
    assert_eq!(sessions.load("empty").await.unwrap(), Some(Vec::new()));

    sessions.delete("primary").await.unwrap();
    assert!(sessions.load("primary").await.unwrap().is_none());
    assert!(sessions.load("empty").await.unwrap().is_some());

    db.teardown().await;
}
