use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id, email = %user.email))]
    async fn save_user(&self, user: User) -> Result<()> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;

        // Email uniqueness is a store constraint; the check and the
        // insert share the write lock.
        if storage.values().any(|u| u.email == user.email) {
            debug!(email = %user.email, "Duplicate email rejected by store");
            return Err(
                DomainError::Conflict(format!("Email {} is already registered", user.email))
                    .into(),
            );
        }

        storage.insert(user.id.clone(), user.clone());
        debug!(
            user_id = %user.id,
            email = %user.email,
            "User saved to memory storage"
        );
        Ok(())
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.values().find(|u| u.email == email).cloned();
        match &user {
            Some(u) => debug!(user_id = %u.id, "User found in storage"),
            None => trace!(email = email, "User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.get(id).cloned();
        match &user {
            Some(u) => debug!(user_id = %u.id, email = %u.email, "User found in storage"),
            None => trace!(user_id = id, "User not found in storage"),
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            username: "rider".to_string(),
            first_name: "jane".to_string(),
            last_name: "wanjiku".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            phone: "0712345678".to_string(),
            id_number: "12345678".to_string(),
            id_pic: "https://example.com/pic".to_string(),
            is_owner: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_save_user_and_find_by_id() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-1", "test@example.com"))
            .await
            .unwrap();

        let retrieved = repo.find_user_by_id("user-1").await.unwrap();
        assert!(retrieved.is_some());
        let retrieved = retrieved.unwrap();
        assert_eq!(retrieved.id, "user-1");
        assert_eq!(retrieved.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-2", "alice@example.com"))
            .await
            .unwrap();

        let found = repo.find_user_by_email("alice@example.com").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, "user-2");
    }

    #[tokio::test]
    async fn test_find_user_by_email_returns_none_for_unknown() {
        let repo = InMemoryUserRepository::new();
        let found = repo
            .find_user_by_email("nonexistent@example.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_by_store() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-3", "dup@example.com"))
            .await
            .unwrap();

        let err = repo
            .save_user(user("user-4", "dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Conflict(_))
        ));

        // The second record was not inserted.
        assert!(repo.find_user_by_id("user-4").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_signups_only_one_wins_per_email() {
        let repo = InMemoryUserRepository::new();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo_clone = repo.clone();
                tokio::spawn(async move {
                    repo_clone
                        .save_user(user(&format!("user-{i}"), "race@example.com"))
                        .await
                })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn test_distinct_emails_all_insert() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.save_user(user(&format!("user-{i}"), &format!("u{i}@example.com")))
                .await
                .unwrap();
        }
        for i in 0..5 {
            assert!(
                repo.find_user_by_email(&format!("u{i}@example.com"))
                    .await
                    .unwrap()
                    .is_some()
            );
        }
    }
}
