mod common;

use common::at;
use core_types::{NewChannel, NewDailyReport, NewMessage};
use futures::future::join_all;
use serde_json::json;

const RACERS: usize = 8;

#[tokio::test]
async fn racing_appends_of_one_message_store_one_row() {
    let Some(db) = common::setup().await else { return };
    let ledger = &db.repo.messages;
    let created = at(2024, 5, 1, 9, 0);

    let copies: Vec<NewMessage> = (0..RACERS)
        .map(|i| NewMessage::text(3, 900, format!("copy {i}"), created))
        .collect();
    let results = join_all(copies.iter().map(|m| ledger.append(m))).await;

    let ids: Vec<i64> = results.into_iter().filter_map(|r| r.unwrap()).collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(ledger.count_by_channel(3).await.unwrap(), 1);

    db.teardown().await;
}

#[tokio::test]
async fn racing_channel_creates_have_one_winner() {
    let Some(db) = common::setup().await else { return };
    let channels = &db.repo.channels;

    let candidates: Vec<NewChannel> = (0..RACERS)
        .map(|i| NewChannel::active(55).with_title(format!("title {i}")))
        .collect();
    let results = join_all(candidates.iter().map(|c| channels.create(c))).await;

    let winners = results.into_iter().filter(|r| *r.as_ref().unwrap()).count();
    assert_eq!(winners, 1);
    assert_eq!(channels.get_all().await.unwrap().len(), 1);

    db.teardown().await;
}

#[tokio::test]
async fn racing_report_upserts_share_one_row() {
    let Some(db) = common::setup().await else { return };
    let reports = &db.repo.reports;

    let drafts: Vec<NewDailyReport> = (0..RACERS)
        .map(|i| NewDailyReport {
            channel_id: 8,
            report_date: "2024-05-01".parse().unwrap(),
            summary: Some(format!("draft {i}")),
            payload: json!({ "draft": i }),
        })
        .collect();
    let results = join_all(drafts.iter().map(|d| reports.upsert(d))).await;

    let stored: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    assert!(stored.iter().all(|r| r.id == stored[0].id));

    let rows = reports.get_by_channel(8).await.unwrap();
    assert_eq!(rows.len(), 1);
    let summary = rows[0].summary.clone().unwrap();
    assert!(summary.starts_with("draft "));

    db.teardown().await;
}
