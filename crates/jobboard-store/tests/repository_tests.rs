//! MongoDB repository integration tests.
//!
//! Run against a local server with
//! `MONGO_URI=mongodb://localhost:27017 cargo test -p jobboard-store -- --ignored`.
//! Each test works in its own throwaway database.

use std::time::Duration;

use jobboard_models::{
    CategoryCount, JobFilter, NewReview, PageWindow, ReviewChanges, ReviewFilter, UNCATEGORIZED,
};
use jobboard_store::bson::oid::ObjectId;
use jobboard_store::bson::{doc, Bson, Document};
use jobboard_store::client::collections;
use jobboard_store::{
    JobListing, JobRepository, MongoJobRepository, MongoReviewRepository, MongoStore,
    OwnedWrite, ReviewRepository, StoreConfig,
};

async fn test_store() -> MongoStore {
    dotenvy::dotenv().ok();

    let config = StoreConfig {
        uri: std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
        database: format!("jobboard_test_{}", ObjectId::new().to_hex()),
        app_name: Some("jobboard-store-tests".to_string()),
        connect_timeout: Duration::from_secs(5),
    };
    MongoStore::connect(&config)
        .await
        .expect("Failed to configure MongoDB client")
}

async fn drop_collections(store: &MongoStore) {
    for name in [collections::JOBS, collections::ACCEPTED_JOBS, collections::REVIEWS] {
        store.collection(name).drop().await.expect("Failed to drop collection");
    }
}

async fn seed_review(repo: &MongoReviewRepository, owner: &str) -> String {
    let review = NewReview {
        job_id: Some("job-1".to_string()),
        text: Some("Great team".to_string()),
        rating: Some(serde_json::json!(4)),
        ..NewReview::default()
    }
    .into_review(owner.to_string(), [Some("Ann")]);

    repo.create(&review).await.expect("Failed to create review").inserted_id
}

async fn raw_review(store: &MongoStore, id: &str) -> Option<Document> {
    let oid = ObjectId::parse_str(id).unwrap();
    store
        .collection(collections::REVIEWS)
        .find_one(doc! { "_id": oid })
        .await
        .expect("Failed to read review")
}

fn titles(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .map(|d| d.get_str("title").unwrap().to_string())
        .collect()
}

/// Non-owners can neither edit nor delete a review, and the stored document is untouched.
#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_review_writes_are_owner_scoped() {
    let store = test_store().await;
    let repo = MongoReviewRepository::new(&store);

    let id = seed_review(&repo, "ann@x.io").await;
    let before = raw_review(&store, &id).await.expect("review should exist");

    let changes = ReviewChanges {
        text: Some("hijacked".to_string()),
        rating: Some(1),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    };
    let result = repo.update_owned(&id, "bob@x.io", &changes).await.unwrap();
    assert_eq!(result, OwnedWrite::NotOwner);

    let result = repo.delete_owned(&id, "bob@x.io").await.unwrap();
    assert_eq!(result, OwnedWrite::NotOwner);

    let after = raw_review(&store, &id).await.expect("review should still exist");
    assert_eq!(before, after);

    // The owner's edit goes through
    let result = repo.update_owned(&id, "ann@x.io", &changes).await.unwrap();
    let OwnedWrite::Applied(ack) = result else {
        panic!("owner update not applied: {:?}", result);
    };
    assert_eq!(ack.matched_count, 1);
    let updated = raw_review(&store, &id).await.unwrap();
    assert_eq!(updated.get_str("text").unwrap(), "hijacked");
    assert_eq!(updated.get_i32("rating").unwrap(), 1);

    drop_collections(&store).await;
}

/// Writes against a well-formed id with no document report NotFound.
#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_review_writes_on_absent_id() {
    let store = test_store().await;
    let repo = MongoReviewRepository::new(&store);
    let absent = ObjectId::new().to_hex();

    let changes = ReviewChanges {
        text: Some("edit".to_string()),
        rating: None,
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    };
    assert_eq!(
        repo.update_owned(&absent, "ann@x.io", &changes).await.unwrap(),
        OwnedWrite::NotFound
    );
    assert_eq!(
        repo.delete_owned(&absent, "ann@x.io").await.unwrap(),
        OwnedWrite::NotFound
    );

    // Owner deletes succeed once, then the id is gone
    let id = seed_review(&repo, "ann@x.io").await;
    let OwnedWrite::Applied(ack) = repo.delete_owned(&id, "ann@x.io").await.unwrap() else {
        panic!("owner delete not applied");
    };
    assert_eq!(ack.deleted_count, 1);
    assert_eq!(
        repo.delete_owned(&id, "ann@x.io").await.unwrap(),
        OwnedWrite::NotFound
    );

    let listed = repo
        .list(&ReviewFilter {
            user_email: Some("ann@x.io".to_string()),
            ..ReviewFilter::default()
        })
        .await
        .unwrap();
    assert!(listed.is_empty());

    drop_collections(&store).await;
}

/// Two consecutive pages concatenate to the head of the full sorted listing.
#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_job_pages_follow_sorted_listing() {
    let store = test_store().await;
    let repo = MongoJobRepository::new(&store);

    for day in 1..=7 {
        repo.create(doc! {
            "title": format!("Job {}", day),
            "category": "Design",
            "postedDate": format!("2024-03-{:02}", day),
        })
        .await
        .unwrap();
    }
    repo.create(doc! { "title": "Other", "category": "Sales", "postedDate": "2024-03-08" })
        .await
        .unwrap();

    let filter = JobFilter::new(Some("Design".to_string()), None);
    let JobListing::All(all) = repo.list(&filter, None).await.unwrap() else {
        panic!("unpaginated listing should be a plain array");
    };
    assert_eq!(all.len(), 7);
    assert_eq!(titles(&all)[0], "Job 7");

    let limit = 3;
    let JobListing::Page(first) = repo.list(&filter, Some(PageWindow::new(1, limit))).await.unwrap()
    else {
        panic!("expected a page");
    };
    let JobListing::Page(second) = repo.list(&filter, Some(PageWindow::new(2, limit))).await.unwrap()
    else {
        panic!("expected a page");
    };
    assert_eq!(first.total, 7);
    assert_eq!(second.total, 7);

    let mut paged = titles(&first.data);
    paged.extend(titles(&second.data));
    assert_eq!(paged, titles(&all[..2 * limit as usize]));

    // Past the end yields no data but the same total
    let JobListing::Page(beyond) = repo.list(&filter, Some(PageWindow::new(9, limit))).await.unwrap()
    else {
        panic!("expected a page");
    };
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.total, 7);

    drop_collections(&store).await;
}

/// Category stats over {a, a, b, null}.
#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_category_stats() {
    let store = test_store().await;
    let repo = MongoJobRepository::new(&store);

    for category in [Bson::from("a"), Bson::from("a"), Bson::from("b"), Bson::Null] {
        repo.create(doc! { "title": "Job", "category": category })
            .await
            .unwrap();
    }

    let stats = repo.count_by_category().await.unwrap();
    assert_eq!(
        stats,
        vec![
            CategoryCount::new(Some("a".to_string()), 2),
            CategoryCount::new(None, 1),
            CategoryCount::new(Some("b".to_string()), 1),
        ]
    );
    assert_eq!(stats[1].category, UNCATEGORIZED);

    drop_collections(&store).await;
}

/// Deleting a job that does not exist acknowledges zero deletions.
#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_delete_absent_job() {
    let store = test_store().await;
    let repo = MongoJobRepository::new(&store);

    let ack = repo.delete(&ObjectId::new().to_hex()).await.unwrap();
    assert!(ack.acknowledged);
    assert_eq!(ack.deleted_count, 0);

    let id = repo
        .create(doc! { "title": "Temp", "category": "Ops" })
        .await
        .unwrap()
        .inserted_id;
    assert!(repo.get(&id).await.unwrap().is_some());
    assert_eq!(repo.delete(&id).await.unwrap().deleted_count, 1);
    assert!(repo.get(&id).await.unwrap().is_none());

    drop_collections(&store).await;
}
