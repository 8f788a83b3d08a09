use uuid::Uuid;

use super::{Caller, ServiceError, ServiceResult};
use crate::database::models::{
    Learner, LearnerReflection, NewReflection, Reflection, ReflectionView, DEFAULT_PROMPT_PURPOSE,
};
use crate::database::Store;
use crate::policy::Role;
use crate::schema::{AiFeedbackInput, CoachFeedbackInput, ReflectionInput};

fn not_found() -> ServiceError {
    ServiceError::NotFound("Reflection not found".to_string())
}

fn view_for(caller: &Caller, reflection: Reflection) -> ReflectionView {
    if caller.is_learner_only() {
        ReflectionView::Learner(LearnerReflection::from(reflection))
    } else {
        ReflectionView::Full(reflection)
    }
}

/// The caller's own learner record; learners without one cannot own reflections.
async fn own_learner(store: &dyn Store, caller: &Caller) -> ServiceResult<Learner> {
    match store.find_learner_by_user(caller.id).await? {
        Some(learner) if learner.active => Ok(learner),
        Some(_) => Err(ServiceError::Forbidden("Learner profile is inactive".to_string())),
        None => Err(ServiceError::Forbidden("No learner profile for this user".to_string())),
    }
}

/// Learners see their own reflections without feedback; coaches and admins see all,
/// optionally narrowed to one learner. Newest first.
pub async fn list(store: &dyn Store, caller: &Caller, learner_id: Option<Uuid>) -> ServiceResult<Vec<ReflectionView>> {
    let filter = if caller.is_learner_only() {
        match store.find_learner_by_user(caller.id).await? {
            Some(learner) => Some(learner.id),
            None => return Ok(Vec::new()),
        }
    } else {
        learner_id
    };

    let reflections = store.list_reflections(filter).await?;
    Ok(reflections.into_iter().map(|r| view_for(caller, r)).collect())
}

pub async fn get(store: &dyn Store, caller: &Caller, id: Uuid) -> ServiceResult<ReflectionView> {
    let reflection = store.find_reflection(id).await?.ok_or_else(not_found)?;

    if caller.is_learner_only() {
        let owner = store.find_learner_by_user(caller.id).await?;
        if owner.map(|l| l.id) != Some(reflection.learner_id) {
            return Err(not_found());
        }
    }
    Ok(view_for(caller, reflection))
}

/// Submit a reflection for the caller's own learner record.
pub async fn create(store: &dyn Store, caller: &Caller, input: ReflectionInput) -> ServiceResult<LearnerReflection> {
    if !caller.is_learner_only() {
        return Err(ServiceError::Forbidden("Only learners can submit reflections".to_string()));
    }
    let draft = input.validate()?;
    let learner = own_learner(store, caller).await?;

    let reflection = store
        .insert_reflection(NewReflection {
            learner_id: learner.id,
            title: draft.title,
            content: draft.content,
            week_start: draft.week_start,
        })
        .await?;

    tracing::info!(reflection = %reflection.id, learner = %learner.id, "reflection submitted");
    Ok(reflection.into())
}

pub async fn attach_feedback(store: &dyn Store, caller: &Caller, id: Uuid, input: CoachFeedbackInput) -> ServiceResult<Reflection> {
    caller.require(Role::Coach)?;
    let feedback = input.validate()?;

    let reflection = store
        .set_coach_feedback(id, &feedback, caller.id)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(reflection = %id, coach = %caller.id, "coach feedback attached");
    Ok(reflection)
}

/// Store AI feedback together with the version of the prompt currently in use.
pub async fn attach_ai_feedback(store: &dyn Store, caller: &Caller, id: Uuid, input: AiFeedbackInput) -> ServiceResult<Reflection> {
    caller.require(Role::Coach)?;
    let feedback = input.validate()?;

    let prompt_version = store.active_prompt(DEFAULT_PROMPT_PURPOSE).await?.map(|p| p.version);
    let reflection = store
        .set_ai_feedback(id, &feedback, prompt_version)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(reflection = %id, ?prompt_version, "AI feedback stored");
    Ok(reflection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewPromptTemplate;
    use crate::testing::Fixture;

    fn input(title: &str) -> ReflectionInput {
        ReflectionInput {
            title: Some(title.to_string()),
            content: Some("This week I practised giving feedback and noticed ".repeat(3)),
            week_start: Some("2025-03-03".to_string()),
        }
    }

    #[tokio::test]
    async fn learner_round_trip_hides_feedback() {
        let fx = Fixture::new().await.unwrap();
        let created = create(fx.store(), &fx.learner, input("Week 10")).await.unwrap();

        attach_feedback(
            fx.store(),
            &fx.coach,
            created.id,
            CoachFeedbackInput { coach_feedback: Some("Great reflection".into()) },
        )
        .await
        .unwrap();

        match get(fx.store(), &fx.learner, created.id).await.unwrap() {
            ReflectionView::Learner(r) => {
                assert_eq!(r.title, "Week 10");
                assert_eq!(r.content, created.content);
                assert_eq!(r.week_start, created.week_start);
            }
            other => panic!("learner received full view: {:?}", other),
        }

        match get(fx.store(), &fx.coach, created.id).await.unwrap() {
            ReflectionView::Full(r) => {
                assert_eq!(r.coach_feedback.as_deref(), Some("Great reflection"));
                assert_eq!(r.coach_feedback_by, Some(fx.coach.id));
            }
            other => panic!("coach received learner view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn learners_only_see_their_own() {
        let fx = Fixture::new().await.unwrap();
        let other = fx.user("Otto Other", Role::Learner).await.unwrap();
        let mine = create(fx.store(), &fx.learner, input("Mine")).await.unwrap();
        let theirs = create(fx.store(), &other, input("Theirs")).await.unwrap();

        let listed = list(fx.store(), &fx.learner, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), mine.id);

        assert!(matches!(get(fx.store(), &fx.learner, theirs.id).await, Err(ServiceError::NotFound(_))));
        assert_eq!(list(fx.store(), &fx.coach, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn coach_can_filter_by_learner() {
        let fx = Fixture::new().await.unwrap();
        let other = fx.user("Otto Other", Role::Learner).await.unwrap();
        create(fx.store(), &fx.learner, input("Mine")).await.unwrap();
        create(fx.store(), &other, input("Theirs")).await.unwrap();

        let learner = fx.learner_record(&fx.learner).await.unwrap();
        let listed = list(fx.store(), &fx.admin, Some(learner.id)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn only_learners_create() {
        let fx = Fixture::new().await.unwrap();
        let err = create(fx.store(), &fx.coach, input("Coach")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn inactive_learner_cannot_create() {
        let fx = Fixture::new().await.unwrap();
        crate::services::users::set_active(fx.store(), &fx.admin, fx.learner.id, false).await.unwrap();
        let err = create(fx.store(), &fx.learner, input("Late")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn learners_cannot_attach_feedback() {
        let fx = Fixture::new().await.unwrap();
        let created = create(fx.store(), &fx.learner, input("Week 1")).await.unwrap();
        let err = attach_feedback(
            fx.store(),
            &fx.learner,
            created.id,
            CoachFeedbackInput { coach_feedback: Some("Self praise".into()) },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn feedback_on_missing_reflection_is_not_found() {
        let fx = Fixture::new().await.unwrap();
        let err = attach_feedback(
            fx.store(),
            &fx.coach,
            Uuid::new_v4(),
            CoachFeedbackInput { coach_feedback: Some("Hello".into()) },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn ai_feedback_records_active_prompt_version() {
        let fx = Fixture::new().await.unwrap();
        let created = create(fx.store(), &fx.learner, input("Week 2")).await.unwrap();
        let prompt = fx
            .store
            .insert_prompt(NewPromptTemplate {
                name: "v3".into(),
                purpose: DEFAULT_PROMPT_PURPOSE.into(),
                content: "Be kind".into(),
                version: 3,
            })
            .await
            .unwrap();
        fx.store.activate_prompt(prompt.id).await.unwrap();

        let updated = attach_ai_feedback(
            fx.store(),
            &fx.admin,
            created.id,
            AiFeedbackInput { ai_feedback: Some("Consider specific examples".into()) },
        )
        .await
        .unwrap();

        assert_eq!(updated.ai_prompt_version, Some(3));
        assert!(updated.ai_feedback_at.is_some());
    }
}
