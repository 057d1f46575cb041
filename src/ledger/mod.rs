//! Contribution-agreement ledger.
//!
//! Signatures are append-only; every status answered here is derived at read time.

use chrono::{DateTime, Utc};

use crate::db::{
    ContributorCreate, CorporateSignatureCreate, DbActorHandle, DbContributor,
    DbCorporateSignature, DbIndividualSignature, DbOrganization, IndividualSignatureCreate,
};
use crate::error::LarderError;
use crate::types::{OrganizationId, PersonId};

#[derive(Clone)]
pub struct AgreementLedger {
    db: DbActorHandle,
}

impl AgreementLedger {
    pub fn new(db: DbActorHandle) -> Self {
        Self { db }
    }

    pub async fn sign_individual(
        &self,
        person_id: PersonId,
        agreement_version: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<DbIndividualSignature, LarderError> {
        self.db
            .sign_individual(IndividualSignatureCreate {
                person_id,
                agreement_version: agreement_version.to_string(),
                signed_at,
            })
            .await
    }

    /// Record a corporate agreement signed by `person_id` on behalf of the organization.
    pub async fn sign_corporate(
        &self,
        person_id: PersonId,
        organization_id: OrganizationId,
        agreement_version: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<DbCorporateSignature, LarderError> {
        self.db
            .sign_corporate(CorporateSignatureCreate {
                person_id,
                organization_id,
                agreement_version: agreement_version.to_string(),
                signed_at,
            })
            .await
    }

    pub async fn create_organization(&self, name: &str) -> Result<DbOrganization, LarderError> {
        self.db.create_organization(name).await
    }

    pub async fn add_contributor(
        &self,
        organization_id: OrganizationId,
        person_id: PersonId,
        admin: bool,
    ) -> Result<DbContributor, LarderError> {
        self.db
            .upsert_contributor(ContributorCreate {
                organization_id,
                person_id,
                admin,
            })
            .await
    }

    pub async fn has_individual_agreement(&self, person_id: PersonId) -> Result<bool, LarderError> {
        Ok(self.db.agreement_status(person_id).await?.individual)
    }

    pub async fn has_corporate_agreement(&self, person_id: PersonId) -> Result<bool, LarderError> {
        Ok(self.db.agreement_status(person_id).await?.corporate)
    }

    /// Either agreement kind satisfies the requirement.
    pub async fn has_any_agreement(&self, person_id: PersonId) -> Result<bool, LarderError> {
        let status = self.db.agreement_status(person_id).await?;
        Ok(status.individual || status.corporate)
    }

    pub async fn latest_individual_signature(
        &self,
        person_id: PersonId,
    ) -> Result<Option<DbIndividualSignature>, LarderError> {
        let signatures = self.db.list_individual_signatures(person_id).await?;
        Ok(latest_signature(signatures))
    }

    /// Fails with [`LarderError::NotFound`] for an unknown organization.
    pub async fn is_organization_admin(
        &self,
        person_id: PersonId,
        organization_id: OrganizationId,
    ) -> Result<bool, LarderError> {
        let contributor = self.db.find_contributor(person_id, organization_id).await?;
        Ok(contributor.is_some_and(|c| c.admin))
    }
}

/// Greatest `signed_at`; on equal timestamps the most recently created row (highest id) wins.
fn latest_signature(
    signatures: impl IntoIterator<Item = DbIndividualSignature>,
) -> Option<DbIndividualSignature> {
    signatures
        .into_iter()
        .max_by(|a, b| a.signed_at.cmp(&b.signed_at).then(a.id.cmp(&b.id)))
}
