//! PostgreSQL backend checks. These run only when `TEST_DATABASE_URL` or
//! `DATABASE_URL` points at a disposable database; otherwise each test returns early.

mod common;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reflect_api::database::models::{LogStatus, NewCoachingLog, NewPromptTemplate, NewUser, SessionType};
use reflect_api::database::{PgStore, Store, StoreError};
use reflect_api::policy::Role;
use uuid::Uuid;

use common::pg_store;

/// Purpose unique to one test run, so tests never share prompt rows.
fn scratch_purpose() -> String {
    format!("t_{}", Uuid::new_v4().simple())
}

fn prompt(name: &str, purpose: &str) -> NewPromptTemplate {
    NewPromptTemplate {
        name: name.to_string(),
        purpose: purpose.to_string(),
        content: format!("{} prompt body", name),
        version: 1,
    }
}

async fn active_ids(store: &PgStore, purpose: &str) -> Result<Vec<Uuid>> {
    Ok(store
        .list_prompts()
        .await?
        .into_iter()
        .filter(|p| p.purpose == purpose && p.active)
        .map(|p| p.id)
        .collect())
}

async fn provision(store: &PgStore, name: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    store
        .provision_user(NewUser {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", id.simple()),
            avatar_url: None,
        })
        .await?;
    Ok(id)
}

#[tokio::test]
async fn activating_b_after_a_leaves_only_b() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let purpose = scratch_purpose();
    let a = store.insert_prompt(prompt("A", &purpose)).await?;
    let b = store.insert_prompt(prompt("B", &purpose)).await?;
    assert!(!a.active && !b.active);

    store.activate_prompt(a.id).await?.context("A exists")?;
    assert_eq!(active_ids(&store, &purpose).await?, vec![a.id]);

    let activated = store.activate_prompt(b.id).await?.context("B exists")?;
    assert!(activated.active);
    assert_eq!(active_ids(&store, &purpose).await?, vec![b.id]);
    assert_eq!(store.active_prompt(&purpose).await?.map(|p| p.id), Some(b.id));

    assert!(store.activate_prompt(Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn racing_activations_never_leave_zero_or_two_active() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let purpose = scratch_purpose();
    let a = store.insert_prompt(prompt("A", &purpose)).await?;
    let b = store.insert_prompt(prompt("B", &purpose)).await?;
    store.activate_prompt(a.id).await?;

    for _ in 0..10 {
        let (left, right) = tokio::join!(store.activate_prompt(a.id), store.activate_prompt(b.id));
        // A loser may be refused by the constraint or the lock manager; the winner's swap stands.
        for outcome in [left, right] {
            if let Err(e) = outcome {
                assert!(matches!(e, StoreError::Conflict(_) | StoreError::Sqlx(_)), "unexpected error: {}", e);
            }
        }

        let active = active_ids(&store, &purpose).await?;
        assert_eq!(active.len(), 1, "active templates after race: {:?}", active);
        assert!(active[0] == a.id || active[0] == b.id);
    }
    Ok(())
}

#[tokio::test]
async fn provisioning_twice_keeps_the_first_user() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let id = Uuid::new_v4();
    let first = NewUser { id, name: "Ada".into(), email: "ada@example.com".into(), avatar_url: None };

    let created = store.provision_user(first.clone()).await?;
    assert_eq!(created.role, Role::Learner);

    let again = store
        .provision_user(NewUser { name: "Someone Else".into(), ..first })
        .await?;
    assert_eq!(again.name, "Ada");
    assert_eq!(again.created_at, created.created_at);

    let learner = store.find_learner_by_user(id).await?.context("learner record")?;
    assert!(learner.active);
    Ok(())
}

#[tokio::test]
async fn role_changes_upsert_and_retire_extension_records() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let id = provision(&store, "Rory").await?;

    let user = store.set_user_role(id, Role::Coach).await?.context("user exists")?;
    assert_eq!(user.role, Role::Coach);
    assert!(store.find_coach_by_user(id).await?.context("coach record")?.active);
    assert!(!store.find_learner_by_user(id).await?.context("learner record")?.active);

    store.set_user_role(id, Role::Learner).await?;
    assert!(store.find_learner_by_user(id).await?.context("learner record")?.active);
    assert!(!store.find_coach_by_user(id).await?.context("coach record")?.active);

    // Toggling leaves a single row per user
    let paused = store.set_learner_active(id, false).await?.context("learner record")?;
    assert!(!paused.active);
    store.set_user_role(id, Role::Learner).await?;
    let resumed = store.find_learner_by_user(id).await?.context("learner record")?;
    assert!(resumed.active);
    assert_eq!(resumed.id, paused.id);

    assert!(store.set_user_role(Uuid::new_v4(), Role::Admin).await?.is_none());
    assert!(store.set_coach_active(Uuid::new_v4(), true).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn dangling_references_are_conflicts() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let coach_id = provision(&store, "Cleo").await?;

    let err = store
        .insert_coaching_log(NewCoachingLog {
            coach_id,
            learner_id: Some(Uuid::new_v4()),
            team_id: None,
            session_date: NaiveDate::from_ymd_opt(2025, 3, 4).context("date")?,
            session_type: SessionType::OneOnOne,
            notes: "Weekly check".into(),
            next_actions: None,
            follow_up_date: None,
            status: LogStatus::Open,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {:?}", err);
    Ok(())
}
