//! People and their linked external accounts.

use larder_schema::ExternalIdentity;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::{IdentityConfig, SearchConfig};
use crate::db::{DbAccount, DbActorHandle, DbPerson, PersonCreate};
use crate::error::LarderError;
use crate::search;
use crate::types::PersonId;

#[derive(Clone)]
pub struct IdentityStore {
    db: DbActorHandle,
    identity: Arc<IdentityConfig>,
    search: Arc<SearchConfig>,
}

impl IdentityStore {
    pub fn new(db: DbActorHandle, identity: Arc<IdentityConfig>, search: Arc<SearchConfig>) -> Self {
        Self {
            db,
            identity,
            search,
        }
    }

    /// Provider whose logins identify commit authors.
    pub fn source_control_provider(&self) -> &str {
        &self.identity.source_control_provider
    }

    pub async fn create_person(&self, name: &str, email: &str) -> Result<DbPerson, LarderError> {
        self.db
            .create_person(PersonCreate {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await
    }

    pub async fn person(&self, id: PersonId) -> Result<DbPerson, LarderError> {
        self.db.get_person(id).await
    }

    /// Create or update `person`'s account for the payload's provider.
    pub async fn account_from_external_login(
        &self,
        person_id: PersonId,
        identity: ExternalIdentity,
    ) -> Result<DbAccount, LarderError> {
        self.db.link_account(person_id, identity).await
    }

    /// Sign-in path: reuse the person behind this provider uid, or create one.
    pub async fn find_or_create_from_identity(
        &self,
        identity: ExternalIdentity,
    ) -> Result<DbPerson, LarderError> {
        self.db.find_or_create_from_identity(identity).await
    }

    pub async fn has_linked_account(
        &self,
        person_id: PersonId,
        provider: &str,
    ) -> Result<bool, LarderError> {
        Ok(self.db.find_account(person_id, provider).await?.is_some())
    }

    /// The person's username on the handle provider, or `""` when none is linked.
    pub async fn handle_for(&self, person_id: PersonId) -> Result<String, LarderError> {
        let account = self
            .db
            .find_account(person_id, &self.identity.handle_provider)
            .await?;
        Ok(account.map(|a| a.username).unwrap_or_default())
    }

    /// The person's login on the source-control provider, if linked.
    pub async fn source_control_login(
        &self,
        person_id: PersonId,
    ) -> Result<Option<String>, LarderError> {
        let account = self
            .db
            .find_account(person_id, &self.identity.source_control_provider)
            .await?;
        Ok(account.map(|a| a.username))
    }

    pub async fn find_by_login(
        &self,
        provider: &str,
        username: &str,
    ) -> Result<Option<DbPerson>, LarderError> {
        self.db.find_person_by_login(provider, username).await
    }

    /// Remove every linked account; returns how many were removed.
    pub async fn unlink_accounts(&self, person_id: PersonId) -> Result<u64, LarderError> {
        self.db.unlink_accounts(person_id).await
    }

    /// People whose name, email or any account username match `query`, most relevant first.
    ///
    /// Ties are broken by name, then id.
    pub async fn search(&self, query: &str) -> Result<Vec<DbPerson>, LarderError> {
        let people = self.db.list_people().await?;
        let mut usernames: HashMap<PersonId, Vec<String>> = HashMap::new();
        for account in self.db.list_accounts(None).await? {
            usernames
                .entry(account.person_id)
                .or_default()
                .push(account.username);
        }

        let threshold = self.search.similarity_threshold;
        let mut scored: Vec<(f32, DbPerson)> = people
            .into_iter()
            .filter_map(|person| {
                let names = usernames.get(&person.id).map(Vec::as_slice).unwrap_or_default();
                let fields = [person.name.as_str(), person.email.as_str()]
                    .into_iter()
                    .chain(names.iter().map(String::as_str));
                let score = search::relevance(query, fields, threshold)?;
                Some((score, person))
            })
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.partial_cmp(sa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });

        debug!(query, matches = scored.len(), "people search");
        Ok(scored.into_iter().map(|(_, person)| person).collect())
    }
}
