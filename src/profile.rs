//! Signed-in user, saved funds and viewing history
//!
//! `UserSession` is owned by the application and handed to whatever needs it.
//! Both fund lists are mirrored into the user's document in the document
//! store on every change, as arrays of
//! `{schemeCode, schemeName, isinGrowth, isinDivReinvestment}` records.

use crate::core::{
    AuthError, AuthProvider, Credentials, Document, DocumentStore, Fund, Identity, SyncError,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub const SELECTED_FUNDS_KEY: &str = "selectedFunds";
pub const VIEWED_FUNDS_KEY: &str = "pastViewedFunds";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Synced,
    /// The last write failed; `retry_sync` pushes the local lists again.
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub identity: Option<Identity>,
    pub email: String,
    pub username: String,
    /// Favorited funds
    pub selected: Vec<Fund>,
    /// Viewing history
    pub viewed: Vec<Fund>,
    pub sync_status: SyncStatus,
}

impl Profile {
    fn signed_in(identity: Identity) -> Self {
        Self {
            email: identity.email.clone().unwrap_or_default(),
            identity: Some(identity),
            ..Self::default()
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    /// The username when one was given at registration, otherwise the email.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }

    fn list_mut(&mut self, list: FundList) -> &mut Vec<Fund> {
        match list {
            FundList::Selected => &mut self.selected,
            FundList::Viewed => &mut self.viewed,
        }
    }
}

/// Outcome of reading the profile document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub selected: usize,
    pub viewed: usize,
    /// Records skipped for lacking a scheme code or name.
    pub dropped: usize,
    /// The identity changed while the read was in flight; nothing was applied.
    pub discarded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FundList {
    Selected,
    Viewed,
}

impl FundList {
    fn key(self) -> &'static str {
        match self {
            FundList::Selected => SELECTED_FUNDS_KEY,
            FundList::Viewed => VIEWED_FUNDS_KEY,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FundRecord<'a> {
    scheme_code: u64,
    scheme_name: &'a str,
    isin_growth: Option<&'a str>,
    isin_div_reinvestment: Option<&'a str>,
}

impl<'a> From<&'a Fund> for FundRecord<'a> {
    fn from(fund: &'a Fund) -> Self {
        Self {
            scheme_code: fund.scheme_code,
            scheme_name: &fund.scheme_name,
            isin_growth: fund.isin_growth.as_deref(),
            isin_div_reinvestment: fund.isin_div_reinvestment.as_deref(),
        }
    }
}

fn encode_funds(funds: &[Fund]) -> Result<Value, SyncError> {
    let records: Vec<FundRecord> = funds.iter().map(FundRecord::from).collect();
    serde_json::to_value(records).map_err(|e| SyncError::Write(e.to_string()))
}

fn decode_record(value: &Value) -> Option<Fund> {
    let record = value.as_object()?;
    let scheme_code = record.get("schemeCode")?.as_u64()?;
    let scheme_name = record.get("schemeName")?.as_str()?;
    let isin = |key: &str| record.get(key).and_then(Value::as_str);
    Some(
        Fund::new(scheme_code, scheme_name)
            .with_isins(isin("isinGrowth"), isin("isinDivReinvestment")),
    )
}

/// Decodes one stored list leniently. Returns `None` when the field is absent
/// or not an array, so the caller keeps what it had.
fn decode_funds(doc: &Document, key: &str, dropped: &mut usize) -> Option<Vec<Fund>> {
    let records = doc.get(key)?.as_array()?;
    let mut seen = HashSet::new();
    let mut funds = Vec::with_capacity(records.len());
    for value in records {
        match decode_record(value) {
            Some(fund) => {
                if seen.insert(fund.scheme_code) {
                    funds.push(fund);
                }
            }
            None => {
                debug!("Dropping malformed {} record: {}", key, value);
                *dropped += 1;
            }
        }
    }
    Some(funds)
}

pub struct UserSession {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    state: RwLock<Profile>,
    // Bumped whenever the identity changes; in-flight loads compare against it
    generation: AtomicU64,
    // Orders profile loads and list writes so neither overwrites the other
    sync_lock: Mutex<()>,
}

impl UserSession {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            auth,
            store,
            state: RwLock::new(Profile::default()),
            generation: AtomicU64::new(0),
            sync_lock: Mutex::new(()),
        }
    }

    /// Adopts an identity the auth provider kept from a previous run.
    /// Returns whether a user was restored.
    pub async fn restore(&self) -> bool {
        let Some(identity) = self.auth.current_user().await else {
            return false;
        };
        self.start(Profile::signed_in(identity)).await;
        if let Err(e) = self.load_profile().await {
            warn!("Failed to load profile for restored session: {}", e);
        }
        true
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity = self
            .auth
            .sign_in(&credentials.email, &credentials.password)
            .await
            .inspect_err(|e| warn!("Sign in failed: {}", e))?;

        info!("Signed in as {}", identity.user_id);
        self.start(Profile::signed_in(identity.clone())).await;
        if let Err(e) = self.load_profile().await {
            warn!("Failed to load profile after sign in: {}", e);
        }
        Ok(identity)
    }

    pub async fn register(
        &self,
        username: &str,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        let identity = self
            .auth
            .create_user(&credentials.email, &credentials.password)
            .await
            .inspect_err(|e| warn!("Registration failed: {}", e))?;

        info!("Registered {}", identity.user_id);
        let mut profile = Profile::signed_in(identity.clone());
        profile.username = username.to_string();
        self.start(profile).await;
        Ok(identity)
    }

    /// Clears the local session whether or not the provider's sign-out
    /// succeeds; a provider failure is still returned.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let result = self.auth.sign_out().await;
        if let Err(e) = &result {
            warn!("Sign out failed, clearing local session anyway: {}", e);
        }
        self.start(Profile::default()).await;
        result
    }

    async fn start(&self, profile: Profile) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = profile;
    }

    /// Reads the signed-in user's document and replaces the local lists.
    /// Does nothing, without touching the store, when nobody is signed in.
    /// Adds made while a load is in flight wait for it and apply on top.
    pub async fn load_profile(&self) -> Result<LoadReport, SyncError> {
        let _sync = self.sync_lock.lock().await;
        let (user_id, generation) = {
            let state = self.state.read().await;
            let Some(identity) = &state.identity else {
                debug!("Skipping profile load, nobody is signed in");
                return Ok(LoadReport::default());
            };
            (
                identity.user_id.clone(),
                self.generation.load(Ordering::SeqCst),
            )
        };

        let doc = self.store.get_document(&user_id).await?;

        let mut report = LoadReport::default();
        let (selected, viewed) = match &doc {
            Some(doc) => (
                decode_funds(doc, SELECTED_FUNDS_KEY, &mut report.dropped),
                decode_funds(doc, VIEWED_FUNDS_KEY, &mut report.dropped),
            ),
            None => (None, None),
        };

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding profile load for {}, session changed", user_id);
            report.discarded = true;
            return Ok(report);
        }
        if let Some(selected) = selected {
            state.selected = selected;
        }
        if let Some(viewed) = viewed {
            state.viewed = viewed;
        }
        report.selected = state.selected.len();
        report.viewed = state.viewed.len();
        if report.dropped > 0 {
            warn!(
                "Dropped {} malformed fund records from profile {}",
                report.dropped, user_id
            );
        }
        debug!("Loaded profile: {:?}", report);
        Ok(report)
    }

    /// Saves `fund` to the favorites and writes the list to the store.
    pub async fn add_selected(&self, fund: &Fund) -> Result<(), SyncError> {
        self.add(FundList::Selected, fund).await
    }

    /// Records `fund` in the viewing history and writes the list to the store.
    pub async fn add_viewed(&self, fund: &Fund) -> Result<(), SyncError> {
        self.add(FundList::Viewed, fund).await
    }

    async fn add(&self, list: FundList, fund: &Fund) -> Result<(), SyncError> {
        let _sync = self.sync_lock.lock().await;
        let (user_id, generation, fields) = {
            let mut state = self.state.write().await;
            let user_id = state
                .identity
                .as_ref()
                .map(|i| i.user_id.clone())
                .ok_or(SyncError::NotSignedIn)?;
            let funds = state.list_mut(list);
            if !funds.iter().any(|f| f.scheme_code == fund.scheme_code) {
                funds.push(fund.clone());
            }
            let mut fields = Document::new();
            fields.insert(list.key().to_string(), encode_funds(funds)?);
            (user_id, self.generation.load(Ordering::SeqCst), fields)
        };

        self.write(&user_id, generation, fields).await
    }

    /// Writes both lists again after a failed sync.
    pub async fn retry_sync(&self) -> Result<(), SyncError> {
        let _sync = self.sync_lock.lock().await;
        let (user_id, generation, fields) = {
            let state = self.state.read().await;
            let user_id = state
                .identity
                .as_ref()
                .map(|i| i.user_id.clone())
                .ok_or(SyncError::NotSignedIn)?;
            let mut fields = Document::new();
            fields.insert(SELECTED_FUNDS_KEY.to_string(), encode_funds(&state.selected)?);
            fields.insert(VIEWED_FUNDS_KEY.to_string(), encode_funds(&state.viewed)?);
            (user_id, self.generation.load(Ordering::SeqCst), fields)
        };

        self.write(&user_id, generation, fields).await
    }

    async fn write(
        &self,
        user_id: &str,
        generation: u64,
        fields: Document,
    ) -> Result<(), SyncError> {
        let result = self.store.set_document(user_id, fields, true).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            state.sync_status = match &result {
                Ok(()) => SyncStatus::Synced,
                Err(e) => SyncStatus::Failed(e.to_string()),
            };
        }
        if let Err(e) = &result {
            warn!("Profile sync for {} failed: {}", user_id, e);
        }
        result
    }

    pub async fn snapshot(&self) -> Profile {
        self.state.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.read().await.is_logged_in()
    }

    pub async fn selected_funds(&self) -> Vec<Fund> {
        self.state.read().await.selected.clone()
    }

    pub async fn viewed_funds(&self) -> Vec<Fund> {
        self.state.read().await.viewed.clone()
    }

    pub async fn sync_status(&self) -> SyncStatus {
        self.state.read().await.sync_status.clone()
    }

    pub async fn display_name(&self) -> String {
        self.state.read().await.display_name().to_string()
    }
}
