//! In-memory reference implementation of [`ProfileStore`].
//!
//! Backs the test suite and the reference server. Mirrors the managed
//! datastore's semantics: equality-filtered lookups, range-filtered counts,
//! and last-write-wins upserts, with no cross-call coordination.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{CoreError, Result},
    profile::{EntitlementState, Profile, StreakState, SubscriptionRecord, UserId},
    store::ProfileStore,
};

#[derive(Debug)]
struct ProjectRow {
    #[allow(dead_code, reason = "id is part of the stored record shape")]
    id: String,
    owner: UserId,
    name: String,
}

#[derive(Debug)]
struct UpdateRow {
    #[allow(dead_code, reason = "id is part of the stored record shape")]
    id: String,
    owner: UserId,
    #[allow(dead_code, reason = "content is part of the stored record shape")]
    content: String,
    posted_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<String, Profile>,
    projects: Vec<ProjectRow>,
    updates: Vec<UpdateRow>,
    subscriptions: HashMap<String, SubscriptionRecord>,
}

/// Thread-safe in-memory store.
///
/// Safe to share across tasks behind an `Arc`; all tables sit behind a single
/// `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored name of every project owned by the user, in
    /// insertion order. Test and demo helper.
    pub async fn project_names(&self, user: &UserId) -> Vec<String> {
        let tables = self.tables.read().await;
        tables
            .projects
            .iter()
            .filter(|p| &p.owner == user)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Returns the billing-history row for a subscription reference, if any.
    /// Test and demo helper.
    pub async fn subscription(&self, subscription_ref: &str) -> Option<SubscriptionRecord> {
        let tables = self.tables.read().await;
        tables.subscriptions.get(subscription_ref).cloned()
    }
}

impl ProfileStore for MemoryStore {
    async fn load_profile(&self, user: &UserId) -> Result<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(user.as_str()).cloned())
    }

    async fn find_by_customer(&self, customer_ref: &str) -> Result<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.entitlement.customer_ref.as_deref() == Some(customer_ref))
            .cloned())
    }

    async fn create_profile(&self, profile: &Profile) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.id.as_str().to_owned(), profile.clone());
        Ok(())
    }

    async fn save_entitlement(&self, user: &UserId, state: &EntitlementState) -> Result<()> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(user.as_str())
            .ok_or_else(|| CoreError::UnknownUser(user.as_str().to_owned()))?;
        profile.entitlement = state.clone();
        Ok(())
    }

    async fn save_streak(&self, user: &UserId, state: &StreakState) -> Result<()> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(user.as_str())
            .ok_or_else(|| CoreError::UnknownUser(user.as_str().to_owned()))?;
        profile.streak = *state;
        Ok(())
    }

    async fn project_count(&self, user: &UserId) -> Result<u32> {
        let tables = self.tables.read().await;
        let count = tables.projects.iter().filter(|p| &p.owner == user).count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn update_count_between(
        &self,
        user: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u32> {
        let tables = self.tables.read().await;
        let count = tables
            .updates
            .iter()
            .filter(|u| &u.owner == user && u.posted_at >= start && u.posted_at < end)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn insert_project(&self, user: &UserId, name: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut tables = self.tables.write().await;
        tables.projects.push(ProjectRow {
            id: id.clone(),
            owner: user.clone(),
            name: name.to_owned(),
        });
        Ok(id)
    }

    async fn insert_update(
        &self,
        user: &UserId,
        content: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut tables = self.tables.write().await;
        tables.updates.push(UpdateRow {
            id: id.clone(),
            owner: user.clone(),
            content: content.to_owned(),
            posted_at,
        });
        Ok(id)
    }

    async fn upsert_subscription(&self, record: &SubscriptionRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .subscriptions
            .insert(record.subscription_ref.clone(), record.clone());
        Ok(())
    }

    async fn mark_subscription_canceled(
        &self,
        subscription_ref: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(record) = tables.subscriptions.get_mut(subscription_ref) {
            record.status = crate::profile::PlanStatus::Canceled;
            record.canceled_at = Some(at);
            record.updated_at = at;
        }
        Ok(())
    }
}
