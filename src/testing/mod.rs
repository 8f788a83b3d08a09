use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Learner, NewUser};
use crate::database::{MemoryStore, Store};
use crate::policy::Role;
use crate::services::Caller;

/// Memory store seeded with one user per role.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub learner: Caller,
    pub coach: Caller,
    pub admin: Caller,
}

impl Fixture {
    pub async fn new() -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let learner = create_user(&store, "Lena Learner", Role::Learner).await?;
        let coach = create_user(&store, "Cole Coach", Role::Coach).await?;
        let admin = create_user(&store, "Ada Admin", Role::Admin).await?;
        Ok(Self { store, learner, coach, admin })
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Provision another user and move them to `role`.
    pub async fn user(&self, name: &str, role: Role) -> anyhow::Result<Caller> {
        create_user(&self.store, name, role).await
    }

    pub async fn learner_record(&self, caller: &Caller) -> anyhow::Result<Learner> {
        self.store
            .find_learner_by_user(caller.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no learner record for {}", caller.id))
    }
}

async fn create_user(store: &MemoryStore, name: &str, role: Role) -> anyhow::Result<Caller> {
    let id = Uuid::new_v4();
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    store
        .provision_user(NewUser { id, name: name.to_string(), email, avatar_url: None })
        .await?;
    let user = store
        .set_user_role(id, role)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {} vanished", id))?;
    Ok(Caller::from(&user))
}
