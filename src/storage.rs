use crate::access::{Profile, Role, ShowSource};
use crate::error::{Result, ShowsError};
use crate::shows::{ShowPayload, ShowRecord};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Tokens returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user_id: String,
}

/// Backend store for identities, profiles and shows.
///
/// Every data call carries the caller's access token so the backend
/// enforces its row-level rules for that caller.
#[async_trait]
pub trait ShowStore: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;
    /// Resolves an access token to a user id.
    async fn current_user(&self, access_token: &str) -> Result<String>;
    async fn fetch_profile(&self, access_token: &str, user_id: &str) -> Result<Option<Profile>>;

    /// Shows ordered by date, oldest first.
    async fn list_shows(&self, access_token: &str, source: ShowSource) -> Result<Vec<ShowRecord>>;
    async fn get_show(&self, access_token: &str, source: ShowSource, id: Uuid) -> Result<Option<ShowRecord>>;
    async fn insert_show(&self, access_token: &str, payload: &ShowPayload) -> Result<ShowRecord>;
    async fn update_show(&self, access_token: &str, id: Uuid, payload: &ShowPayload) -> Result<ShowRecord>;
    async fn delete_show(&self, access_token: &str, id: Uuid) -> Result<()>;

    /// Cheap reachability check used at startup.
    async fn probe(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user_id: String,
    access_token: String,
}

/// In-memory store for development and tests.
///
/// Mirrors the backend's row rules closely enough for the service: artists
/// with a scope only see their own act, and `shows_public` never carries
/// money.
#[derive(Default)]
pub struct InMemoryStore {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    profiles: Arc<Mutex<HashMap<String, Profile>>>,
    shows: Arc<Mutex<Vec<ShowRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a login and its profile. `profile: None` models a user
    /// whose profile row was never created.
    pub fn add_user(&self, email: &str, password: &str, access_token: &str, profile: Option<Profile>) -> String {
        let user_id = Uuid::new_v4().to_string();
        self.lock_accounts().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id: user_id.clone(),
                access_token: access_token.to_string(),
            },
        );
        if let Some(profile) = profile {
            self.lock_profiles().insert(user_id.clone(), profile);
        }
        user_id
    }

    pub fn seed_show(&self, mut record: ShowRecord) -> Uuid {
        if record.id.is_nil() {
            record.id = Uuid::new_v4();
        }
        let id = record.id;
        self.lock_shows().push(record);
        id
    }

    pub fn show_count(&self) -> usize {
        self.lock_shows().len()
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_profiles(&self) -> std::sync::MutexGuard<'_, HashMap<String, Profile>> {
        self.profiles.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_shows(&self) -> std::sync::MutexGuard<'_, Vec<ShowRecord>> {
        self.shows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn caller_profile(&self, access_token: &str) -> Result<Profile> {
        let user_id = self
            .lock_accounts()
            .values()
            .find(|a| a.access_token == access_token)
            .map(|a| a.user_id.clone())
            .ok_or(ShowsError::Unauthorized)?;
        self.lock_profiles().get(&user_id).cloned().ok_or(ShowsError::MissingProfile)
    }

    fn visible(profile: &Profile, source: ShowSource, record: &ShowRecord) -> Option<ShowRecord> {
        if profile.role == Role::Artist {
            if let Some(scope) = profile.artist_scope {
                if record.artist != Some(scope) {
                    return None;
                }
            }
        }
        let record = record.clone();
        Some(if source.includes_money() { record } else { record.strip_money() })
    }
}

#[async_trait]
impl ShowStore for InMemoryStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let accounts = self.lock_accounts();
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(AuthSession {
                access_token: account.access_token.clone(),
                user_id: account.user_id.clone(),
            }),
            _ => Err(ShowsError::Unauthorized),
        }
    }

    async fn current_user(&self, access_token: &str) -> Result<String> {
        self.lock_accounts()
            .values()
            .find(|a| a.access_token == access_token)
            .map(|a| a.user_id.clone())
            .ok_or(ShowsError::Unauthorized)
    }

    async fn fetch_profile(&self, _access_token: &str, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.lock_profiles().get(user_id).cloned())
    }

    async fn list_shows(&self, access_token: &str, source: ShowSource) -> Result<Vec<ShowRecord>> {
        let profile = self.caller_profile(access_token)?;
        let mut rows: Vec<ShowRecord> = self
            .lock_shows()
            .iter()
            .filter_map(|r| Self::visible(&profile, source, r))
            .collect();
        // Ascending by date, undated rows last
        rows.sort_by_key(|r| (r.show_date.is_none(), r.show_date));
        Ok(rows)
    }

    async fn get_show(&self, access_token: &str, source: ShowSource, id: Uuid) -> Result<Option<ShowRecord>> {
        let profile = self.caller_profile(access_token)?;
        Ok(self
            .lock_shows()
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| Self::visible(&profile, source, r)))
    }

    async fn insert_show(&self, access_token: &str, payload: &ShowPayload) -> Result<ShowRecord> {
        self.caller_profile(access_token)?;
        let mut record = ShowRecord {
            id: Uuid::new_v4(),
            created_at: Some(Utc::now()),
            ..ShowRecord::default()
        };
        payload.apply_to(&mut record);
        self.lock_shows().push(record.clone());
        debug!("Created show {} with id {}", payload.event_name, record.id);
        Ok(record)
    }

    async fn update_show(&self, access_token: &str, id: Uuid, payload: &ShowPayload) -> Result<ShowRecord> {
        self.caller_profile(access_token)?;
        let mut shows = self.lock_shows();
        let record = shows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ShowsError::NotFound(format!("show {}", id)))?;
        payload.apply_to(record);
        Ok(record.clone())
    }

    async fn delete_show(&self, access_token: &str, id: Uuid) -> Result<()> {
        self.caller_profile(access_token)?;
        let mut shows = self.lock_shows();
        let before = shows.len();
        shows.retain(|r| r.id != id);
        if shows.len() == before {
            return Err(ShowsError::NotFound(format!("show {}", id)));
        }
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        Ok(())
    }
}
