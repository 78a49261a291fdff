use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::models::*;

/// Server-side filters understood by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFilter {
    /// Records not yet owned by any Person.
    PersonIsNull,
}

impl QueryFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryFilter::PersonIsNull => "person-is-null",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub filter: Option<QueryFilter>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Vec<String>,
}

impl QueryOptions {
    pub fn filtered(filter: QueryFilter) -> Self {
        Self { filter: Some(filter), ..Self::default() }
    }

    pub fn page(mut self, page: u32, size: u32) -> Self {
        self.page = Some(page);
        self.size = Some(size);
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sort.push(key.into());
        self
    }

    /// Key/value pairs in the order the API expects them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(f) = self.filter { pairs.push(("filter", f.as_str().to_string())); }
        if let Some(p) = self.page { pairs.push(("page", p.to_string())); }
        if let Some(s) = self.size { pairs.push(("size", s.to_string())); }
        for key in &self.sort { pairs.push(("sort", key.clone())); }
        pairs
    }
}

/// A list result together with the server's total count, when it sent one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, total_count: None }
    }

    pub fn into_items(self) -> Vec<T> { self.items }
}

#[async_trait]
pub trait EntityService<T: Send>: Send + Sync {
    async fn query(&self, opts: QueryOptions) -> ServiceResult<Page<T>>;
    async fn find(&self, id: Id) -> ServiceResult<T>;
}

#[async_trait]
pub trait EntityWriter<T: Send>: Send + Sync {
    async fn create(&self, entity: T) -> ServiceResult<T>;
    async fn update(&self, entity: T) -> ServiceResult<T>;
    async fn delete(&self, id: Id) -> ServiceResult<()>;
}

pub trait PersonService: EntityService<Person> + EntityWriter<Person> {}

impl<T> PersonService for T where T: EntityService<Person> + EntityWriter<Person> {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use crate::error::ClientError;
    use std::collections::BTreeMap;
    use std::sync::{Arc, RwLock};

    #[derive(Default)]
    pub struct State {
        people: BTreeMap<Id, Person>,
        profiles: BTreeMap<Id, Profile>,
        account_deletions: BTreeMap<Id, AccountDeletion>,
        conversations: BTreeMap<Id, Conversation>,
        contacts: BTreeMap<Id, Contact>,
        likes: BTreeMap<Id, Like>,
        next_id: Id,
    }

    /// Records the in-memory backend knows how to keep.
    pub trait Stored: Identified + Clone + Send + Sync + 'static {
        fn rows(state: &State) -> &BTreeMap<Id, Self>;
        fn rows_mut(state: &mut State) -> &mut BTreeMap<Id, Self>;

        /// Answers the `person-is-null` filter.
        fn unowned(&self, _state: &State) -> bool { true }

        fn check(&self, _state: &State) -> ServiceResult<()> { Ok(()) }
    }

    impl Stored for Person {
        fn rows(s: &State) -> &BTreeMap<Id, Self> { &s.people }
        fn rows_mut(s: &mut State) -> &mut BTreeMap<Id, Self> { &mut s.people }

        // profile and account deletion are one-to-one
        fn check(&self, s: &State) -> ServiceResult<()> {
            for other in s.people.values().filter(|p| p.id != self.id) {
                if self.profile_id().is_some() && other.profile_id() == self.profile_id() {
                    return Err(ClientError::Conflict);
                }
                if self.account_deletion_id().is_some() && other.account_deletion_id() == self.account_deletion_id() {
                    return Err(ClientError::Conflict);
                }
            }
            Ok(())
        }
    }

    impl Stored for Profile {
        fn rows(s: &State) -> &BTreeMap<Id, Self> { &s.profiles }
        fn rows_mut(s: &mut State) -> &mut BTreeMap<Id, Self> { &mut s.profiles }
        fn unowned(&self, s: &State) -> bool {
            !s.people.values().any(|p| p.profile_id().is_some() && p.profile_id() == self.id)
        }
    }

    impl Stored for AccountDeletion {
        fn rows(s: &State) -> &BTreeMap<Id, Self> { &s.account_deletions }
        fn rows_mut(s: &mut State) -> &mut BTreeMap<Id, Self> { &mut s.account_deletions }
        fn unowned(&self, s: &State) -> bool {
            !s.people.values().any(|p| p.account_deletion_id().is_some() && p.account_deletion_id() == self.id)
        }
    }

    impl Stored for Conversation {
        fn rows(s: &State) -> &BTreeMap<Id, Self> { &s.conversations }
        fn rows_mut(s: &mut State) -> &mut BTreeMap<Id, Self> { &mut s.conversations }
    }

    impl Stored for Contact {
        fn rows(s: &State) -> &BTreeMap<Id, Self> { &s.contacts }
        fn rows_mut(s: &mut State) -> &mut BTreeMap<Id, Self> { &mut s.contacts }
    }

    impl Stored for Like {
        fn rows(s: &State) -> &BTreeMap<Id, Self> { &s.likes }
        fn rows_mut(s: &mut State) -> &mut BTreeMap<Id, Self> { &mut s.likes }
    }

    #[derive(Clone, Default)]
    pub struct InMemBackend {
        state: Arc<RwLock<State>>,
    }

    impl InMemBackend {
        pub fn new() -> Self { Self::default() }

        fn next_id(state: &mut State) -> Id {
            state.next_id += 1;
            state.next_id
        }

        /// Seed a record directly, bypassing constraint checks.
        pub fn insert<T: Stored>(&self, mut entity: T) -> T {
            let mut s = self.state.write().unwrap_or_else(|e| e.into_inner());
            let id = match entity.id() {
                Some(id) => {
                    s.next_id = s.next_id.max(id);
                    id
                }
                None => Self::next_id(&mut s),
            };
            entity.set_id(id);
            T::rows_mut(&mut s).insert(id, entity.clone());
            entity
        }
    }

    #[async_trait]
    impl<T: Stored> EntityService<T> for InMemBackend {
        async fn query(&self, opts: QueryOptions) -> ServiceResult<Page<T>> {
            let s = self.state.read().unwrap_or_else(|e| e.into_inner());
            let matching: Vec<T> = T::rows(&s)
                .values()
                .filter(|row| match opts.filter {
                    Some(QueryFilter::PersonIsNull) => row.unowned(&s),
                    None => true,
                })
                .cloned()
                .collect();
            let total = matching.len() as u64;
            let items = match (opts.page, opts.size) {
                (page, Some(size)) => matching
                    .into_iter()
                    .skip(page.unwrap_or(0) as usize * size as usize)
                    .take(size as usize)
                    .collect(),
                _ => matching,
            };
            Ok(Page { items, total_count: Some(total) })
        }

        async fn find(&self, id: Id) -> ServiceResult<T> {
            let s = self.state.read().unwrap_or_else(|e| e.into_inner());
            T::rows(&s).get(&id).cloned().ok_or(ClientError::NotFound)
        }
    }

    #[async_trait]
    impl<T: Stored> EntityWriter<T> for InMemBackend {
        async fn create(&self, mut entity: T) -> ServiceResult<T> {
            let mut s = self.state.write().unwrap_or_else(|e| e.into_inner());
            if entity.id().is_some() {
                return Err(ClientError::Conflict);
            }
            entity.check(&s)?;
            let id = Self::next_id(&mut s);
            entity.set_id(id);
            T::rows_mut(&mut s).insert(id, entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: T) -> ServiceResult<T> {
            let mut s = self.state.write().unwrap_or_else(|e| e.into_inner());
            let id = entity.id().ok_or(ClientError::NotFound)?;
            if !T::rows(&s).contains_key(&id) {
                return Err(ClientError::NotFound);
            }
            entity.check(&s)?;
            T::rows_mut(&mut s).insert(id, entity.clone());
            Ok(entity)
        }

        async fn delete(&self, id: Id) -> ServiceResult<()> {
            let mut s = self.state.write().unwrap_or_else(|e| e.into_inner());
            T::rows_mut(&mut s).remove(&id).map(|_| ()).ok_or(ClientError::NotFound)
        }
    }
}
