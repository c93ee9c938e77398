//! Storage tests against a real Postgres. They run only when `DATABASE_URL`
//! points at a database the migrations may be applied to.

use std::env;

use chrono::{Duration, Utc};
use hereoz_backend::{
    database::{
        pool::run_migrations,
        postgres::PgStore,
        repository::{
            ApplicationRepository, NotificationRepository, OfferRepository, Page,
            SwipeRepository, UserRepository,
        },
    },
    error::Error,
    models::{
        application::{ApplicationFilter, ApplicationStatus, StatusChange},
        notification::NotificationKind,
        offer::{NewOffer, OfferFilter, OfferStatus},
        swipe::{NewSwipe, SwipeAction},
        user::{NewUser, UserRole},
    },
};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn setup_store() -> Option<PgStore> {
    dotenvy::dotenv().ok();
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("pool");
    run_migrations(&pool).await.expect("migrations");
    Some(PgStore::new(pool))
}

async fn user(store: &PgStore, role: UserRole) -> Uuid {
    UserRepository::create(
        store,
        NewUser {
            email: format!("{}@hereoz.test", Uuid::new_v4()),
            password_hash: "not-a-real-hash".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            role,
            company: (role == UserRole::Recruiter).then(|| "Acme".to_string()),
        },
    )
    .await
    .expect("user")
    .id
}

fn offer(recruiter_id: Uuid, title: &str, location: &str, remote: bool, status: OfferStatus) -> NewOffer {
    NewOffer {
        recruiter_id,
        title: title.into(),
        company: "Acme".into(),
        location: location.into(),
        contract_type: Some("CDI".into()),
        salary_min: None,
        salary_max: None,
        currency: None,
        description: "Build the matching backend".into(),
        skills: vec!["Rust".into(), "SQL".into()],
        remote,
        status,
    }
}

fn swipe(user_id: Uuid, offer_id: Uuid, action: SwipeAction) -> NewSwipe {
    NewSwipe {
        user_id,
        offer_id,
        action,
        rejection_reason: None,
        matching_score: Some(64.0),
    }
}

fn all() -> Page {
    Page { limit: 100, offset: 0 }
}

#[tokio::test]
async fn duplicate_swipe_conflicts_and_writes_nothing() {
    let Some(store) = setup_store().await else { return };
    let recruiter = user(&store, UserRole::Recruiter).await;
    let candidate = user(&store, UserRole::Candidate).await;
    let offer = OfferRepository::create(&store, offer(recruiter, "Rust dev", "Paris", false, OfferStatus::Published))
        .await
        .unwrap();

    SwipeRepository::record(&store, swipe(candidate, offer.id, SwipeAction::Right), true)
        .await
        .unwrap();
    let err = SwipeRepository::record(&store, swipe(candidate, offer.id, SwipeAction::Right), true)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err:?}");

    let (_, swipes) = SwipeRepository::list_for_user(&store, candidate, None, all()).await.unwrap();
    assert_eq!(swipes, 1);
    let filter = ApplicationFilter {
        candidate_id: Some(candidate),
        ..ApplicationFilter::default()
    };
    let (_, applications) = ApplicationRepository::list(&store, &filter, all()).await.unwrap();
    assert_eq!(applications, 1);
}

#[tokio::test]
async fn right_swipe_and_its_application_commit_together() {
    let Some(store) = setup_store().await else { return };
    let recruiter = user(&store, UserRole::Recruiter).await;
    let candidate = user(&store, UserRole::Candidate).await;
    let offer = OfferRepository::create(&store, offer(recruiter, "Data engineer", "Lyon", true, OfferStatus::Published))
        .await
        .unwrap();

    let (event, application) =
        SwipeRepository::record(&store, swipe(candidate, offer.id, SwipeAction::Right), true)
            .await
            .unwrap();
    let application = application.expect("application for a right swipe");
    assert_eq!(application.swipe_id, event.id);
    assert_eq!(application.status, ApplicationStatus::New);
    assert_eq!(application.version, 1);

    // A swipe the database refuses leaves no application behind.
    let bad = NewSwipe {
        matching_score: Some(150.0),
        ..swipe(candidate, Uuid::new_v4(), SwipeAction::Right)
    };
    assert!(SwipeRepository::record(&store, bad, true).await.is_err());

    let filter = ApplicationFilter {
        candidate_id: Some(candidate),
        ..ApplicationFilter::default()
    };
    let (rows, total) = ApplicationRepository::list(&store, &filter, all()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, application.id);
}

#[tokio::test]
async fn status_write_is_a_version_compare_and_set() {
    let Some(store) = setup_store().await else { return };
    let recruiter = user(&store, UserRole::Recruiter).await;
    let candidate = user(&store, UserRole::Candidate).await;
    let offer = OfferRepository::create(&store, offer(recruiter, "SRE", "Nantes", false, OfferStatus::Published))
        .await
        .unwrap();
    let (_, application) =
        SwipeRepository::record(&store, swipe(candidate, offer.id, SwipeAction::Right), true)
            .await
            .unwrap();
    let application = application.unwrap();

    let change = |status| StatusChange {
        expected_version: application.version,
        status,
        reject_reason: None,
        withdrawn_at: None,
    };
    let viewed = store
        .change_status(application.id, change(ApplicationStatus::Viewed))
        .await
        .unwrap();
    assert_eq!(viewed.version, application.version + 1);

    let err = store
        .change_status(application.id, change(ApplicationStatus::Rejected))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err:?}");

    let stored = ApplicationRepository::find_by_id(&store, application.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ApplicationStatus::Viewed);
    assert_eq!(stored.version, viewed.version);
}

#[tokio::test]
async fn offer_filters_narrow_the_listing() {
    let Some(store) = setup_store().await else { return };
    let recruiter = user(&store, UserRole::Recruiter).await;
    for (title, location, remote, status) in [
        ("Rust backend engineer", "Paris", false, OfferStatus::Published),
        ("Frontend engineer", "Paris", true, OfferStatus::Published),
        ("Rust platform lead", "Lyon", true, OfferStatus::Published),
        ("Rust intern", "Lille", false, OfferStatus::Draft),
    ] {
        OfferRepository::create(&store, offer(recruiter, title, location, remote, status))
            .await
            .unwrap();
    }
    let mine = |f: OfferFilter| OfferFilter {
        recruiter_id: Some(recruiter),
        ..f
    };

    let (_, total) = OfferRepository::list(&store, &mine(OfferFilter::default()), all()).await.unwrap();
    assert_eq!(total, 4);

    let published = mine(OfferFilter {
        status: Some(OfferStatus::Published),
        ..OfferFilter::default()
    });
    let (_, total) = OfferRepository::list(&store, &published, all()).await.unwrap();
    assert_eq!(total, 3);

    let rust_published = OfferFilter {
        search: Some("rUsT".into()),
        ..published.clone()
    };
    let (rows, total) = OfferRepository::list(&store, &rust_published, all()).await.unwrap();
    assert_eq!(total, 2);
    assert!(rows.iter().all(|o| o.title.contains("Rust")));

    let remote_in_paris = mine(OfferFilter {
        location: Some("paris".into()),
        remote: Some(true),
        ..OfferFilter::default()
    });
    let (rows, total) = OfferRepository::list(&store, &remote_in_paris, all()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].title, "Frontend engineer");

    // The total ignores paging.
    let (rows, total) = OfferRepository::list(&store, &published, Page { limit: 2, offset: 2 })
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn swiped_offer_cannot_be_deleted() {
    let Some(store) = setup_store().await else { return };
    let recruiter = user(&store, UserRole::Recruiter).await;
    let candidate = user(&store, UserRole::Candidate).await;
    let offer = OfferRepository::create(&store, offer(recruiter, "QA", "Paris", false, OfferStatus::Published))
        .await
        .unwrap();
    SwipeRepository::record(&store, swipe(candidate, offer.id, SwipeAction::Left), false)
        .await
        .unwrap();

    assert!(store.has_swipes(offer.id).await.unwrap());
    let err = OfferRepository::delete(&store, offer.id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err:?}");
    assert!(SwipeRepository::find(&store, candidate, offer.id).await.unwrap().is_some());
}

#[tokio::test]
async fn claimed_notification_is_not_handed_out_twice() {
    let Some(store) = setup_store().await else { return };
    let recipient = user(&store, UserRole::Candidate).await;
    let queued = store
        .enqueue(recipient, NotificationKind::InterviewScheduled, json!({ "test": true }))
        .await
        .unwrap();

    // Other rows may be pending in a shared database; drain until ours shows up.
    let at = Utc::now() + Duration::seconds(1);
    let lease_until = at + Duration::days(1);
    let mut ours = None;
    for _ in 0..1000 {
        match store.claim_due(at, lease_until).await.unwrap() {
            Some(n) if n.id == queued.id => {
                ours = Some(n);
                break;
            }
            Some(_) => continue,
            None => break,
        }
    }
    let ours = ours.expect("queued notification claimed");
    assert!(ours.next_retry_at.is_some_and(|t| t > at));

    while let Some(next) = store.claim_due(at, lease_until).await.unwrap() {
        assert_ne!(next.id, queued.id);
    }
}
