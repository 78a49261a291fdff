use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::alert::AlertSink;
use crate::error::{ClientError, ServiceResult};
use crate::events::{EntityList, EventBus, ListModification};
use crate::modal::{modal, Dismissal, ModalHandle, ModalRef};
use crate::models::*;
use crate::services::{EntityService, PersonService, QueryFilter, QueryOptions};

/// Roles offered by the person form.
pub const AUTHORITIES: [&str; 2] = ["ROLE_USER", "ROLE_ADMIN"];

/// Remote collaborators of the person dialog.
#[derive(Clone)]
pub struct DialogServices {
    pub people: Arc<dyn PersonService>,
    pub conversations: Arc<dyn EntityService<Conversation>>,
    pub profiles: Arc<dyn EntityService<Profile>>,
    pub account_deletions: Arc<dyn EntityService<AccountDeletion>>,
}

impl DialogServices {
    /// All four services backed by one client or store.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: PersonService
            + EntityService<Conversation>
            + EntityService<Profile>
            + EntityService<AccountDeletion>
            + 'static,
    {
        Self {
            people: backend.clone(),
            conversations: backend.clone(),
            profiles: backend.clone(),
            account_deletions: backend,
        }
    }
}

/// Shared view of a dialog's in-flight save, readable while `save` runs.
#[derive(Clone, Default)]
pub struct SavingFlag(Arc<AtomicBool>);

impl SavingFlag {
    pub fn get(&self) -> bool { self.0.load(Ordering::SeqCst) }

    fn set(&self, saving: bool) { self.0.store(saving, Ordering::SeqCst) }
}

/// Editing session for a single Person.
pub struct PersonDialog {
    pub person: Person,
    pub authorities: Vec<String>,
    pub conversations: Vec<Conversation>,
    pub profiles: Vec<Profile>,
    pub account_deletions: Vec<AccountDeletion>,
    is_saving: SavingFlag,
    services: DialogServices,
    alerts: Arc<dyn AlertSink>,
    events: EventBus,
    modal: ModalHandle<Person>,
}

impl PersonDialog {
    pub fn new(
        person: Person,
        services: DialogServices,
        alerts: Arc<dyn AlertSink>,
        events: EventBus,
    ) -> (Self, ModalRef<Person>) {
        let (handle, modal_ref) = modal();
        let dialog = Self {
            person,
            authorities: AUTHORITIES.iter().map(|a| a.to_string()).collect(),
            conversations: Vec::new(),
            profiles: Vec::new(),
            account_deletions: Vec::new(),
            is_saving: SavingFlag::default(),
            services,
            alerts,
            events,
            modal: handle,
        };
        (dialog, modal_ref)
    }

    pub fn is_saving(&self) -> bool { self.is_saving.get() }

    pub fn saving_flag(&self) -> SavingFlag { self.is_saving.clone() }

    pub fn is_open(&self) -> bool { self.modal.is_open() }

    /// Loads the three candidate lists. A failed list is reported and left empty.
    pub async fn init(&mut self) {
        self.is_saving.set(false);
        let (conversations, profiles, account_deletions) = tokio::join!(
            self.services.conversations.query(QueryOptions::default()),
            candidates(self.services.profiles.as_ref(), self.person.profile_id()),
            candidates(self.services.account_deletions.as_ref(), self.person.account_deletion_id()),
        );
        self.conversations = self.loaded("conversations", conversations.map(|page| page.into_items()));
        self.profiles = self.loaded("profiles", profiles);
        self.account_deletions = self.loaded("account deletions", account_deletions);
        debug!(
            conversations = self.conversations.len(),
            profiles = self.profiles.len(),
            account_deletions = self.account_deletions.len(),
            "person dialog initialised"
        );
    }

    /// Creates or updates the person depending on whether it has an id.
    pub async fn save(&mut self) -> ServiceResult<Person> {
        self.is_saving.set(true);
        let person = self.person.clone();
        let result = if person.id.is_some() {
            self.services.people.update(person).await
        } else {
            self.services.people.create(person).await
        };
        match result {
            Ok(saved) => {
                self.on_save_success(saved.clone());
                Ok(saved)
            }
            Err(e) => {
                self.on_save_error(&e);
                Err(e)
            }
        }
    }

    /// Closes the modal without saving.
    pub fn clear(&self) {
        self.modal.dismiss(Dismissal::Cancel);
    }

    pub fn track_conversation_by_id(_index: usize, item: &Conversation) -> Option<Id> { item.id }

    pub fn track_profile_by_id(_index: usize, item: &Profile) -> Option<Id> { item.id }

    pub fn track_account_deletion_by_id(_index: usize, item: &AccountDeletion) -> Option<Id> { item.id }

    fn on_save_success(&mut self, saved: Person) {
        info!(id = ?saved.id, "person saved");
        self.events.broadcast(ListModification::ok(EntityList::Person));
        self.is_saving.set(false);
        self.person = saved.clone();
        self.modal.dismiss(Dismissal::Saved(saved));
    }

    fn on_save_error(&mut self, error: &ClientError) {
        warn!(%error, "saving person failed");
        self.is_saving.set(false);
        self.on_error(error);
    }

    fn on_error(&self, error: &ClientError) {
        self.alerts.error(&error.alert_message());
    }

    fn loaded<T>(&self, what: &str, result: ServiceResult<Vec<T>>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                warn!(list = what, error = %e, "loading candidates failed");
                self.on_error(&e);
                Vec::new()
            }
        }
    }
}

/// Unowned records, with the currently owned one (if any) first.
async fn candidates<T: Identified + Send>(
    service: &dyn EntityService<T>,
    current: Option<Id>,
) -> ServiceResult<Vec<T>> {
    let unassigned = service
        .query(QueryOptions::filtered(QueryFilter::PersonIsNull))
        .await?
        .into_items();
    let Some(id) = current else { return Ok(unassigned) };
    let owned = service.find(id).await?;
    let mut list = Vec::with_capacity(unassigned.len() + 1);
    let rest: Vec<T> = unassigned.into_iter().filter(|c| !c.same_entity(&owned)).collect();
    list.push(owned);
    list.extend(rest);
    Ok(list)
}
