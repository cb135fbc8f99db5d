//! In-memory collaborators for service tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use restoboost_shared::EmailError;
use restoboost_shared::types::{AccountId, FeedbackId, PageRequest, StaffMemberId, VenueId};

use crate::account::{Account, AccountStore};
use crate::analytics::{AnalyticsStore, DailyBucket, EventCounts};
use crate::plan::{Plan, PlanState};
use crate::review::{
    FeedbackAlert, FeedbackNotifier, FeedbackRecord, NewFeedback, Rating, ReviewStore,
    ScanEventKind,
};
use crate::slug::SlugLookup;
use crate::store::StoreError;
use crate::venue::{NewVenue, StaffMember, Venue, VenueSettings, VenueStore};

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    venues: Vec<Venue>,
    staff: Vec<StaffMember>,
    events: Vec<(VenueId, ScanEventKind, DateTime<Utc>)>,
    feedback: Vec<FeedbackRecord>,
}

/// A `Mutex<..>` backed store implementing every persistence trait.
#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    emails: AtomicU32,
    fail_staff: AtomicBool,
    fail_events: AtomicBool,
    delete_before_save: AtomicBool,
    rejected_insert: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    fn next_email(&self) -> String {
        format!("owner{}@resto.fr", self.emails.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn seed_account(&self, plan: Plan) -> Account {
        let plan_state = if plan.is_paid() {
            PlanState::active(plan)
        } else {
            PlanState::default()
        };
        let account = Account {
            id: AccountId::new(),
            email: self.next_email(),
            plan_state,
            billing_customer_id: None,
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .accounts
            .insert(account.id, account.clone());
        account
    }

    /// A new account on `plan` owning one venue named after `slug`.
    pub(crate) fn seed(
        &self,
        plan: Plan,
        slug: &str,
        maps_url: Option<&str>,
    ) -> (Account, Venue) {
        let account = self.seed_account(plan);
        let venue = Venue {
            id: VenueId::new(),
            account_id: account.id,
            name: slug.replace('-', " "),
            slug: slug.to_string(),
            maps_url: maps_url.map(str::to_string),
            logo_url: None,
            scans_this_month: 0,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().venues.push(venue.clone());
        (account, venue)
    }

    pub(crate) fn seed_staff(&self, venue_id: VenueId, name: &str) -> StaffMember {
        let staff = StaffMember {
            id: StaffMemberId::new(),
            venue_id,
            name: name.to_string(),
            total_scans: 0,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().staff.push(staff.clone());
        staff
    }

    pub(crate) fn push_event(
        &self,
        venue_id: VenueId,
        kind: ScanEventKind,
        at: DateTime<Utc>,
    ) {
        self.tables.lock().unwrap().events.push((venue_id, kind, at));
    }

    pub(crate) fn push_feedback(&self, venue_id: VenueId, rating: u8, at: DateTime<Utc>) {
        let record = FeedbackRecord {
            id: FeedbackId::new(),
            venue_id,
            rating: Rating::new(i64::from(rating)).unwrap(),
            comment: None,
            contact_email: None,
            created_at: at,
        };
        self.tables.lock().unwrap().feedback.push(record);
    }

    /// Plan writes find their account already deleted.
    pub(crate) fn delete_accounts_before_save(&self) {
        self.delete_before_save.store(true, Ordering::SeqCst);
    }

    pub(crate) fn account(&self, id: AccountId) -> Account {
        self.tables.lock().unwrap().accounts[&id].clone()
    }

    pub(crate) fn venue(&self, id: VenueId) -> Venue {
        let tables = self.tables.lock().unwrap();
        tables.venues.iter().find(|v| v.id == id).unwrap().clone()
    }

    pub(crate) fn staff(&self, id: StaffMemberId) -> StaffMember {
        let tables = self.tables.lock().unwrap();
        tables.staff.iter().find(|s| s.id == id).unwrap().clone()
    }

    pub(crate) fn events(&self) -> Vec<(VenueId, ScanEventKind)> {
        let tables = self.tables.lock().unwrap();
        tables.events.iter().map(|(v, k, _)| (*v, *k)).collect()
    }

    pub(crate) fn feedback(&self) -> Vec<FeedbackRecord> {
        self.tables.lock().unwrap().feedback.clone()
    }

    pub(crate) fn set_scans(&self, id: VenueId, scans: u32) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(venue) = tables.venues.iter_mut().find(|v| v.id == id) {
            venue.scans_this_month = scans;
        }
    }

    pub(crate) fn set_staff_scans(&self, id: StaffMemberId, scans: u32) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(staff) = tables.staff.iter_mut().find(|s| s.id == id) {
            staff.total_scans = scans;
        }
    }

    pub(crate) fn set_customer(&self, id: AccountId, customer_id: &str) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(account) = tables.accounts.get_mut(&id) {
            account.billing_customer_id = Some(customer_id.to_string());
        }
    }

    pub(crate) fn fail_staff_increments(&self) {
        self.fail_staff.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_event_log(&self) {
        self.fail_events.store(true, Ordering::SeqCst);
    }

    /// The next venue insert fails with `err`.
    pub(crate) fn reject_inserts(&self, err: StoreError) {
        *self.rejected_insert.lock().unwrap() = Some(err);
    }

    fn owned_venue_index(
        tables: &Tables,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Option<usize> {
        tables
            .venues
            .iter()
            .position(|v| v.id == venue_id && v.account_id == account_id)
    }
}

impl AccountStore for MemoryStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.tables.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn find_by_customer_id(&self, customer_id: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .values()
            .find(|a| a.billing_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn upsert_account(&self, id: AccountId, email: &str) -> Result<Account, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let account = tables.accounts.entry(id).or_insert_with(|| Account {
            id,
            email: email.to_string(),
            plan_state: PlanState::default(),
            billing_customer_id: None,
            created_at: Utc::now(),
        });
        Ok(account.clone())
    }

    async fn save_plan_state(
        &self,
        id: AccountId,
        state: PlanState,
    ) -> Result<Option<Account>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if self.delete_before_save.load(Ordering::SeqCst) {
            tables.accounts.remove(&id);
        }
        Ok(tables.accounts.get_mut(&id).map(|account| {
            account.plan_state = state;
            account.clone()
        }))
    }

    async fn link_customer(&self, id: AccountId, customer_id: &str) -> Result<(), StoreError> {
        self.set_customer(id, customer_id);
        Ok(())
    }
}

impl SlugLookup for MemoryStore {
    async fn slug_taken(&self, slug: &str, except: Option<VenueId>) -> Result<bool, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .venues
            .iter()
            .any(|v| v.slug == slug && Some(v.id) != except))
    }
}

impl VenueStore for MemoryStore {
    async fn count_venues(&self, account_id: AccountId) -> Result<u64, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.venues.iter().filter(|v| v.account_id == account_id).count() as u64)
    }

    async fn list_venues(&self, account_id: AccountId) -> Result<Vec<Venue>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .venues
            .iter()
            .filter(|v| v.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn find_owned_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Option<Venue>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(Self::owned_venue_index(&tables, account_id, venue_id)
            .map(|i| tables.venues[i].clone()))
    }

    async fn insert_venue(&self, venue: NewVenue) -> Result<Venue, StoreError> {
        if let Some(err) = self.rejected_insert.lock().unwrap().take() {
            return Err(err);
        }
        let mut tables = self.tables.lock().unwrap();
        if tables.venues.iter().any(|v| v.slug == venue.slug) {
            return Err(StoreError::UniqueViolation("venues_slug_key".to_string()));
        }
        let plan = tables
            .accounts
            .get(&venue.account_id)
            .map(Account::plan)
            .unwrap_or_default();
        let owned = tables
            .venues
            .iter()
            .filter(|v| v.account_id == venue.account_id)
            .count();
        if owned as u64 >= u64::from(plan.max_venues()) {
            return Err(StoreError::QuotaViolation("venue quota".to_string()));
        }

        let venue = Venue {
            id: VenueId::new(),
            account_id: venue.account_id,
            name: venue.name,
            slug: venue.slug,
            maps_url: venue.maps_url,
            logo_url: None,
            scans_this_month: 0,
            created_at: Utc::now(),
        };
        tables.venues.push(venue.clone());
        Ok(venue)
    }

    async fn update_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        settings: VenueSettings,
    ) -> Result<Option<Venue>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .venues
            .iter()
            .any(|v| v.slug == settings.slug && v.id != venue_id)
        {
            return Err(StoreError::UniqueViolation("venues_slug_key".to_string()));
        }
        let Some(i) = Self::owned_venue_index(&tables, account_id, venue_id) else {
            return Ok(None);
        };
        let venue = &mut tables.venues[i];
        venue.name = settings.name;
        venue.slug = settings.slug;
        venue.maps_url = settings.maps_url;
        Ok(Some(venue.clone()))
    }

    async fn set_logo_url(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        logo_url: Option<String>,
    ) -> Result<Option<Venue>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(i) = Self::owned_venue_index(&tables, account_id, venue_id) else {
            return Ok(None);
        };
        tables.venues[i].logo_url = logo_url;
        Ok(Some(tables.venues[i].clone()))
    }

    async fn delete_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(i) = Self::owned_venue_index(&tables, account_id, venue_id) else {
            return Ok(false);
        };
        tables.venues.remove(i);
        tables.staff.retain(|s| s.venue_id != venue_id);
        tables.events.retain(|(v, _, _)| *v != venue_id);
        tables.feedback.retain(|f| f.venue_id != venue_id);
        Ok(true)
    }

    async fn list_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Vec<StaffMember>, StoreError> {
        let tables = self.tables.lock().unwrap();
        if Self::owned_venue_index(&tables, account_id, venue_id).is_none() {
            return Ok(Vec::new());
        }
        let mut staff: Vec<_> = tables
            .staff
            .iter()
            .filter(|s| s.venue_id == venue_id)
            .cloned()
            .collect();
        staff.sort_by(|a, b| b.total_scans.cmp(&a.total_scans));
        Ok(staff)
    }

    async fn insert_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        name: &str,
    ) -> Result<StaffMember, StoreError> {
        let owned = {
            let tables = self.tables.lock().unwrap();
            Self::owned_venue_index(&tables, account_id, venue_id).is_some()
        };
        if !owned {
            return Err(StoreError::unavailable("row-level security rejected the insert"));
        }
        Ok(self.seed_staff(venue_id, name))
    }

    async fn delete_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        staff_id: StaffMemberId,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if Self::owned_venue_index(&tables, account_id, venue_id).is_none() {
            return Ok(false);
        }
        let before = tables.staff.len();
        tables
            .staff
            .retain(|s| !(s.id == staff_id && s.venue_id == venue_id));
        Ok(tables.staff.len() < before)
    }
}

impl ReviewStore for MemoryStore {
    async fn find_venue_by_slug(&self, slug: &str) -> Result<Option<Venue>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.venues.iter().find(|v| v.slug == slug).cloned())
    }

    async fn find_venue(&self, id: VenueId) -> Result<Option<Venue>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.venues.iter().find(|v| v.id == id).cloned())
    }

    async fn increment_scans(&self, venue_id: VenueId) -> Result<u32, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let venue = tables
            .venues
            .iter_mut()
            .find(|v| v.id == venue_id)
            .ok_or_else(|| StoreError::unavailable("venue vanished"))?;
        venue.scans_this_month += 1;
        Ok(venue.scans_this_month)
    }

    async fn record_event(&self, venue_id: VenueId, kind: ScanEventKind) -> Result<(), StoreError> {
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("scan_events insert failed"));
        }
        self.push_event(venue_id, kind, Utc::now());
        Ok(())
    }

    async fn increment_staff_scans(
        &self,
        staff_id: StaffMemberId,
        venue_id: VenueId,
    ) -> Result<bool, StoreError> {
        if self.fail_staff.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("staff_members update failed"));
        }
        let mut tables = self.tables.lock().unwrap();
        match tables
            .staff
            .iter_mut()
            .find(|s| s.id == staff_id && s.venue_id == venue_id)
        {
            Some(staff) => {
                staff.total_scans += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        let record = FeedbackRecord {
            id: FeedbackId::new(),
            venue_id: feedback.venue_id,
            rating: feedback.rating,
            comment: feedback.comment,
            contact_email: feedback.contact_email,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().feedback.push(record.clone());
        Ok(record)
    }
}

impl AnalyticsStore for MemoryStore {
    async fn count_events(&self, venue_id: VenueId) -> Result<EventCounts, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut counts = EventCounts::default();
        for (_, kind, _) in tables.events.iter().filter(|(v, _, _)| *v == venue_id) {
            counts.record(*kind);
        }
        Ok(counts)
    }

    async fn daily_counts(
        &self,
        venue_id: VenueId,
        since: Option<DateTime<Utc>>,
        tz: Tz,
    ) -> Result<Vec<DailyBucket>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut days: BTreeMap<NaiveDate, EventCounts> = BTreeMap::new();
        for (_, kind, at) in tables
            .events
            .iter()
            .filter(|(v, _, at)| *v == venue_id && since.is_none_or(|s| *at >= s))
        {
            days.entry(at.with_timezone(&tz).date_naive())
                .or_default()
                .record(*kind);
        }
        Ok(days
            .into_iter()
            .map(|(date, counts)| DailyBucket { date, counts })
            .collect())
    }

    async fn list_feedback(
        &self,
        venue_id: VenueId,
        page: &PageRequest,
    ) -> Result<(Vec<FeedbackRecord>, u64), StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<_> = tables
            .feedback
            .iter()
            .filter(|f| f.venue_id == venue_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = records.len() as u64;
        let page = records
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .collect();
        Ok((page, total))
    }
}

/// Records alerts instead of sending them.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<FeedbackAlert>>,
    failing: bool,
}

impl RecordingNotifier {
    /// A notifier whose transport always fails.
    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub(crate) fn sent(&self) -> Vec<FeedbackAlert> {
        self.sent.lock().unwrap().clone()
    }
}

impl FeedbackNotifier for RecordingNotifier {
    async fn notify(&self, alert: &FeedbackAlert) -> Result<(), EmailError> {
        if self.failing {
            return Err(EmailError::SendError("smtp relay refused".to_string()));
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}
