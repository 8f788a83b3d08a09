use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use super::{field_error, Caller, ServiceError, ServiceResult};
use crate::config::CoachingConfig;
use crate::database::models::{CoachingLog, LogStatus, NewCoachingLog};
use crate::database::Store;
use crate::policy::{has_role, Role};
use crate::schema::{CoachingLogInput, CoachingLogStatusInput};

fn not_found() -> ServiceError {
    ServiceError::NotFound("Coaching log not found".to_string())
}

/// `None` for admins (every log), `Some(author)` for coaches.
fn author_scope(caller: &Caller) -> ServiceResult<Option<Uuid>> {
    caller.require(Role::Coach)?;
    Ok(if has_role(caller.role, Role::Admin) { None } else { Some(caller.id) })
}

/// Writers are admins or coaches with an active coach record.
async fn require_writer(store: &dyn Store, caller: &Caller) -> ServiceResult<()> {
    caller.require(Role::Coach)?;
    if has_role(caller.role, Role::Admin) {
        return Ok(());
    }
    match store.find_coach_by_user(caller.id).await? {
        Some(coach) if coach.active => Ok(()),
        _ => Err(ServiceError::Forbidden("An active coach profile is required".to_string())),
    }
}

pub async fn list(store: &dyn Store, caller: &Caller) -> ServiceResult<Vec<CoachingLog>> {
    let scope = author_scope(caller)?;
    Ok(store.list_coaching_logs(scope).await?)
}

pub async fn get(store: &dyn Store, caller: &Caller, id: Uuid) -> ServiceResult<CoachingLog> {
    let scope = author_scope(caller)?;
    let log = store.find_coaching_log(id).await?.ok_or_else(not_found)?;
    match scope {
        Some(author) if log.coach_id != author => Err(not_found()),
        _ => Ok(log),
    }
}

pub async fn create(store: &dyn Store, caller: &Caller, input: CoachingLogInput) -> ServiceResult<CoachingLog> {
    require_writer(store, caller).await?;
    let draft = input.validate()?;

    if let Some(learner_id) = draft.learner_id {
        if store.find_learner(learner_id).await?.is_none() {
            return Err(field_error("learner_id", "Learner not found"));
        }
    }
    if let Some(team_id) = draft.team_id {
        if store.find_team(team_id).await?.is_none() {
            return Err(field_error("team_id", "Team not found"));
        }
    }

    let log = store
        .insert_coaching_log(NewCoachingLog {
            coach_id: caller.id,
            learner_id: draft.learner_id,
            team_id: draft.team_id,
            session_date: draft.session_date,
            session_type: draft.session_type,
            notes: draft.notes,
            next_actions: draft.next_actions,
            follow_up_date: draft.follow_up_date,
            status: draft.status,
        })
        .await?;

    tracing::info!(log = %log.id, coach = %caller.id, "coaching log created");
    Ok(log)
}

/// Open follow-ups due between today and `days_ahead` days from now, soonest first.
pub async fn upcoming(
    store: &dyn Store,
    caller: &Caller,
    days_ahead: Option<i64>,
    config: &CoachingConfig,
) -> ServiceResult<Vec<CoachingLog>> {
    upcoming_from(store, caller, days_ahead, config, Utc::now().date_naive()).await
}

pub(crate) async fn upcoming_from(
    store: &dyn Store,
    caller: &Caller,
    days_ahead: Option<i64>,
    config: &CoachingConfig,
    today: NaiveDate,
) -> ServiceResult<Vec<CoachingLog>> {
    let scope = author_scope(caller)?;
    let days = days_ahead.unwrap_or(config.default_days_ahead);
    if !(0..=config.max_days_ahead).contains(&days) {
        return Err(field_error(
            "days_ahead",
            format!("Must be between 0 and {}", config.max_days_ahead),
        ));
    }

    let until = Duration::try_days(days)
        .and_then(|window| today.checked_add_signed(window))
        .ok_or_else(|| field_error("days_ahead", "Window runs past the supported date range"))?;
    Ok(store.upcoming_follow_ups(scope, today, until).await?)
}

/// Move a log forward. `done -> open` is refused; repeating the current status is a no-op.
pub async fn update_status(
    store: &dyn Store,
    caller: &Caller,
    id: Uuid,
    input: CoachingLogStatusInput,
) -> ServiceResult<CoachingLog> {
    require_writer(store, caller).await?;
    let next = input.validate()?;

    let log = get(store, caller, id).await?;
    if log.status == next {
        return Ok(log);
    }
    if !log.status.can_transition_to(next) {
        return Err(ServiceError::Conflict(format!(
            "Cannot change status from {} to {}",
            log.status, next
        )));
    }

    let updated = store.set_coaching_log_status(id, next).await?.ok_or_else(not_found)?;
    if next == LogStatus::Done {
        tracing::info!(log = %id, "follow-up completed");
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::NewTeam;
    use crate::testing::Fixture;

    fn log_for(learner_id: Uuid, follow_up: Option<&str>) -> CoachingLogInput {
        CoachingLogInput {
            learner_id: Some(learner_id.to_string()),
            session_date: Some("2025-03-01".into()),
            session_type: Some("one_on_one".into()),
            notes: Some("Talked about presentation skills".into()),
            follow_up_date: follow_up.map(str::to_string),
            ..Default::default()
        }
    }

    fn coaching() -> CoachingConfig {
        AppConfig::development().coaching
    }

    #[tokio::test]
    async fn coaches_see_only_their_logs() {
        let fx = Fixture::new().await.unwrap();
        let other = fx.user("Otis Coach", Role::Coach).await.unwrap();
        let learner = fx.learner_record(&fx.learner).await.unwrap();

        let mine = create(fx.store(), &fx.coach, log_for(learner.id, None)).await.unwrap();
        let theirs = create(fx.store(), &other, log_for(learner.id, None)).await.unwrap();

        let listed = list(fx.store(), &fx.coach).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
        assert!(matches!(get(fx.store(), &fx.coach, theirs.id).await, Err(ServiceError::NotFound(_))));

        assert_eq!(list(fx.store(), &fx.admin).await.unwrap().len(), 2);
        assert!(matches!(list(fx.store(), &fx.learner).await, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn unknown_references_are_field_errors() {
        let fx = Fixture::new().await.unwrap();
        let err = create(fx.store(), &fx.coach, log_for(Uuid::new_v4(), None)).await.unwrap_err();
        match err {
            ServiceError::ValidationFailed(errors) => assert!(errors.contains_key("learner_id")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn team_only_log_is_accepted() {
        let fx = Fixture::new().await.unwrap();
        let team = fx.store.insert_team(NewTeam { name: "Cohort".into(), active: true }).await.unwrap();
        let input = CoachingLogInput {
            learner_id: None,
            team_id: Some(team.id.to_string()),
            session_type: Some("group".into()),
            ..log_for(Uuid::nil(), None)
        };
        let log = create(fx.store(), &fx.coach, input).await.unwrap();
        assert_eq!(log.team_id, Some(team.id));
        assert_eq!(log.learner_id, None);
    }

    #[tokio::test]
    async fn inactive_coach_cannot_write() {
        let fx = Fixture::new().await.unwrap();
        let learner = fx.learner_record(&fx.learner).await.unwrap();
        crate::services::users::set_active(fx.store(), &fx.admin, fx.coach.id, false).await.unwrap();
        let err = create(fx.store(), &fx.coach, log_for(learner.id, None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn upcoming_excludes_done_and_out_of_window() {
        let fx = Fixture::new().await.unwrap();
        let learner = fx.learner_record(&fx.learner).await.unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let due_soon = create(fx.store(), &fx.coach, log_for(learner.id, Some("2025-03-12"))).await.unwrap();
        let due_today = create(fx.store(), &fx.coach, log_for(learner.id, Some("2025-03-10"))).await.unwrap();
        create(fx.store(), &fx.coach, log_for(learner.id, Some("2025-04-30"))).await.unwrap();
        create(fx.store(), &fx.coach, log_for(learner.id, Some("2025-03-05"))).await.unwrap();
        let done = create(fx.store(), &fx.coach, log_for(learner.id, Some("2025-03-11"))).await.unwrap();
        update_status(fx.store(), &fx.coach, done.id, CoachingLogStatusInput { status: Some("done".into()) })
            .await
            .unwrap();

        let logs = upcoming_from(fx.store(), &fx.coach, None, &coaching(), today).await.unwrap();
        let ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![due_today.id, due_soon.id]);
    }

    #[tokio::test]
    async fn upcoming_rejects_out_of_range_window() {
        let fx = Fixture::new().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        for days in [-1, 366] {
            let err = upcoming_from(fx.store(), &fx.coach, Some(days), &coaching(), today).await.unwrap_err();
            assert!(matches!(err, ServiceError::ValidationFailed(_)));
        }
        assert!(upcoming_from(fx.store(), &fx.coach, Some(0), &coaching(), today).await.is_ok());
    }

    #[tokio::test]
    async fn oversized_window_is_a_field_error() {
        let fx = Fixture::new().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let unbounded = CoachingConfig { default_days_ahead: 7, max_days_ahead: i64::MAX };
        for days in [i64::MAX, 400_000_000] {
            let err = upcoming_from(fx.store(), &fx.coach, Some(days), &unbounded, today).await.unwrap_err();
            assert!(matches!(err, ServiceError::ValidationFailed(_)));
        }
    }

    #[tokio::test]
    async fn status_is_one_way() {
        let fx = Fixture::new().await.unwrap();
        let learner = fx.learner_record(&fx.learner).await.unwrap();
        let log = create(fx.store(), &fx.coach, log_for(learner.id, None)).await.unwrap();
        let status = |s: &str| CoachingLogStatusInput { status: Some(s.to_string()) };

        let open = update_status(fx.store(), &fx.coach, log.id, status("open")).await.unwrap();
        assert_eq!(open.status, LogStatus::Open);

        let done = update_status(fx.store(), &fx.coach, log.id, status("done")).await.unwrap();
        assert_eq!(done.status, LogStatus::Done);
        assert_eq!(
            update_status(fx.store(), &fx.coach, log.id, status("done")).await.unwrap().status,
            LogStatus::Done
        );

        let err = update_status(fx.store(), &fx.coach, log.id, status("open")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
