//! Classifies observed commit authors as verified (linked to a person who has
//! satisfied the agreement requirement) or unverified.

use std::collections::HashMap;
use tracing::debug;

use crate::db::{DbActorHandle, DbCommitAuthor};
use crate::error::LarderError;
use crate::identity::IdentityStore;
use crate::ledger::AgreementLedger;
use crate::types::PersonId;

/// One full classification of a set of commit authors.
///
/// Every author lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorPartition {
    pub verified: Vec<DbCommitAuthor>,
    pub unverified: Vec<DbCommitAuthor>,
}

#[derive(Clone)]
pub struct CommitAuthorResolver {
    db: DbActorHandle,
    identity: IdentityStore,
    ledger: AgreementLedger,
}

impl CommitAuthorResolver {
    pub fn new(db: DbActorHandle, identity: IdentityStore, ledger: AgreementLedger) -> Self {
        Self {
            db,
            identity,
            ledger,
        }
    }

    pub async fn record(&self, login: &str, repository: &str) -> Result<DbCommitAuthor, LarderError> {
        self.db.record_commit_author(login, repository).await
    }

    pub async fn resolve_verified(&self, repository: &str) -> Result<Vec<DbCommitAuthor>, LarderError> {
        Ok(self.classify_repository(repository).await?.verified)
    }

    pub async fn resolve_unverified(
        &self,
        repository: &str,
    ) -> Result<Vec<DbCommitAuthor>, LarderError> {
        Ok(self.classify_repository(repository).await?.unverified)
    }

    /// Both halves from a single read of the repository's authors.
    pub async fn classify_repository(&self, repository: &str) -> Result<AuthorPartition, LarderError> {
        let authors = self.db.commit_authors_in_repository(repository).await?;
        let provider = self.identity.source_control_provider().to_string();

        let mut standing: HashMap<PersonId, bool> = HashMap::new();
        let mut classified = Vec::with_capacity(authors.len());
        for author in authors {
            let verdict = match self.identity.find_by_login(&provider, &author.login).await? {
                Some(person) => {
                    if let Some(&signed) = standing.get(&person.id) {
                        Some(signed)
                    } else {
                        let signed = self.ledger.has_any_agreement(person.id).await?;
                        standing.insert(person.id, signed);
                        Some(signed)
                    }
                }
                None => None,
            };
            classified.push((author, verdict));
        }

        let partition = partition(classified);
        debug!(
            repository,
            verified = partition.verified.len(),
            unverified = partition.unverified.len(),
            "commit authors classified"
        );
        Ok(partition)
    }

    /// The person's own commit identities across repositories (authors whose login is
    /// the person's source-control username), split by the person's agreement status.
    pub async fn identities_for(&self, person_id: PersonId) -> Result<AuthorPartition, LarderError> {
        let Some(login) = self.identity.source_control_login(person_id).await? else {
            return Ok(AuthorPartition::default());
        };
        let authors = self.db.commit_authors_with_login(&login).await?;
        let signed = self.ledger.has_any_agreement(person_id).await?;
        Ok(partition(authors.into_iter().map(|a| (a, Some(signed)))))
    }

    pub async fn verified_identities_for(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<DbCommitAuthor>, LarderError> {
        Ok(self.identities_for(person_id).await?.verified)
    }

    pub async fn unverified_identities_for(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<DbCommitAuthor>, LarderError> {
        Ok(self.identities_for(person_id).await?.unverified)
    }
}

/// `Some(true)`: linked and signed. `Some(false)`: linked, not signed. `None`: unlinked.
fn partition(
    classified: impl IntoIterator<Item = (DbCommitAuthor, Option<bool>)>,
) -> AuthorPartition {
    let (verified, unverified): (Vec<_>, Vec<_>) = classified
        .into_iter()
        .partition(|(_, verdict)| *verdict == Some(true));
    AuthorPartition {
        verified: verified.into_iter().map(|(a, _)| a).collect(),
        unverified: unverified.into_iter().map(|(a, _)| a).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn author(id: i64, login: &str) -> DbCommitAuthor {
        DbCommitAuthor {
            id,
            login: login.to_string(),
            repository: "chef/redis".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn partition_covers_every_author_exactly_once() {
        let input = vec![
            (author(1, "signed"), Some(true)),
            (author(2, "unsigned"), Some(false)),
            (author(3, "stranger"), None),
            (author(4, "also-signed"), Some(true)),
        ];
        let all: Vec<_> = input.iter().map(|(a, _)| a.clone()).collect();

        let p = partition(input);
        assert_eq!(
            p.verified.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1, 4]
        );
        assert_eq!(
            p.unverified.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(p.verified.len() + p.unverified.len(), all.len());
        assert!(p.verified.iter().all(|a| !p.unverified.contains(a)));
    }
}
