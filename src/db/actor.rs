use crate::db::collaboration;
use crate::db::commit_authors;
use crate::db::create::{
    CollaboratorAction, CollaboratorBatch, ContributorCreate, CorporateSignatureCreate,
    IndividualSignatureCreate, PersonCreate,
};
use crate::db::identity;
use crate::db::ledger::{self, AgreementStatus};
use crate::db::membership;
use crate::db::models::{
    DbAccount, DbCommitAuthor, DbContributor, DbCorporateSignature, DbGroup,
    DbIndividualSignature, DbOrganization, DbPerson,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::LarderError;
use crate::types::{
    Collaborator, CollaboratorId, GroupId, OrganizationId, PersonId, Resource, ResourceCreate,
    ResourceId, ResourceKind,
};
use larder_schema::ExternalIdentity;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

type Reply<T> = RpcReplyPort<Result<T, LarderError>>;

/// Every message is handled to completion before the next one starts, and each
/// mutating message runs in its own transaction.
#[derive(Debug)]
pub enum DbActorMessage {
    // Identity
    CreatePerson(PersonCreate, Reply<DbPerson>),
    GetPerson(PersonId, Reply<DbPerson>),
    ListPeople(Reply<Vec<DbPerson>>),
    /// Create or update the (person, provider) account.
    LinkAccount(PersonId, ExternalIdentity, Reply<DbAccount>),
    FindOrCreateFromIdentity(ExternalIdentity, Reply<DbPerson>),
    FindAccount(PersonId, String, Reply<Option<DbAccount>>),
    /// `None` lists every account.
    ListAccounts(Option<PersonId>, Reply<Vec<DbAccount>>),
    FindPersonByLogin(String, String, Reply<Option<DbPerson>>),
    UnlinkAccounts(PersonId, Reply<u64>),

    // Groups
    CreateGroup(String, Reply<DbGroup>),
    AddGroupMember(GroupId, PersonId, Reply<()>),
    RemoveGroupMember(GroupId, PersonId, Reply<bool>),
    GroupMemberIds(GroupId, Reply<Vec<PersonId>>),

    // Agreements
    SignIndividual(IndividualSignatureCreate, Reply<DbIndividualSignature>),
    SignCorporate(CorporateSignatureCreate, Reply<DbCorporateSignature>),
    ListIndividualSignatures(PersonId, Reply<Vec<DbIndividualSignature>>),
    AgreementStatus(PersonId, Reply<AgreementStatus>),
    CreateOrganization(String, Reply<DbOrganization>),
    UpsertContributor(ContributorCreate, Reply<DbContributor>),
    FindContributor(PersonId, OrganizationId, Reply<Option<DbContributor>>),

    // Commit authors
    RecordCommitAuthor(String, String, Reply<DbCommitAuthor>),
    CommitAuthorsInRepository(String, Reply<Vec<DbCommitAuthor>>),
    CommitAuthorsWithLogin(String, Reply<Vec<DbCommitAuthor>>),

    // Resources and collaborators
    CreateResource(ResourceCreate, Reply<Resource>),
    GetResource(ResourceKind, ResourceId, Reply<Resource>),
    ListCollaborators(ResourceKind, ResourceId, Reply<Vec<Collaborator>>),
    GetCollaborator(CollaboratorId, Reply<Collaborator>),
    FindCollaborator(PersonId, ResourceKind, ResourceId, Reply<Option<Collaborator>>),
    CreateCollaborators(CollaboratorBatch, Reply<Vec<Collaborator>>),
    RemoveCollaborator(CollaboratorAction, Reply<Collaborator>),
    TransferOwnership(CollaboratorAction, Reply<Resource>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

fn rpc_failed<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> LarderError {
    move |e| LarderError::RactorError(format!("DbActor {op} RPC failed: {e}"))
}

impl DbActorHandle {
    pub async fn create_person(&self, create: PersonCreate) -> Result<DbPerson, LarderError> {
        ractor::call!(self.actor, DbActorMessage::CreatePerson, create)
            .map_err(rpc_failed("CreatePerson"))?
    }

    pub async fn get_person(&self, id: PersonId) -> Result<DbPerson, LarderError> {
        ractor::call!(self.actor, DbActorMessage::GetPerson, id).map_err(rpc_failed("GetPerson"))?
    }

    pub async fn list_people(&self) -> Result<Vec<DbPerson>, LarderError> {
        ractor::call!(self.actor, DbActorMessage::ListPeople).map_err(rpc_failed("ListPeople"))?
    }

    pub async fn link_account(
        &self,
        person_id: PersonId,
        identity: ExternalIdentity,
    ) -> Result<DbAccount, LarderError> {
        ractor::call!(self.actor, DbActorMessage::LinkAccount, person_id, identity)
            .map_err(rpc_failed("LinkAccount"))?
    }

    pub async fn find_or_create_from_identity(
        &self,
        identity: ExternalIdentity,
    ) -> Result<DbPerson, LarderError> {
        ractor::call!(self.actor, DbActorMessage::FindOrCreateFromIdentity, identity)
            .map_err(rpc_failed("FindOrCreateFromIdentity"))?
    }

    pub async fn find_account(
        &self,
        person_id: PersonId,
        provider: &str,
    ) -> Result<Option<DbAccount>, LarderError> {
        ractor::call!(
            self.actor,
            DbActorMessage::FindAccount,
            person_id,
            provider.to_string()
        )
        .map_err(rpc_failed("FindAccount"))?
    }

    pub async fn list_accounts(
        &self,
        person_id: Option<PersonId>,
    ) -> Result<Vec<DbAccount>, LarderError> {
        ractor::call!(self.actor, DbActorMessage::ListAccounts, person_id)
            .map_err(rpc_failed("ListAccounts"))?
    }

    pub async fn find_person_by_login(
        &self,
        provider: &str,
        username: &str,
    ) -> Result<Option<DbPerson>, LarderError> {
        ractor::call!(
            self.actor,
            DbActorMessage::FindPersonByLogin,
            provider.to_string(),
            username.to_string()
        )
        .map_err(rpc_failed("FindPersonByLogin"))?
    }

    pub async fn unlink_accounts(&self, person_id: PersonId) -> Result<u64, LarderError> {
        ractor::call!(self.actor, DbActorMessage::UnlinkAccounts, person_id)
            .map_err(rpc_failed("UnlinkAccounts"))?
    }

    pub async fn create_group(&self, name: &str) -> Result<DbGroup, LarderError> {
        ractor::call!(self.actor, DbActorMessage::CreateGroup, name.to_string())
            .map_err(rpc_failed("CreateGroup"))?
    }

    pub async fn add_group_member(
        &self,
        group_id: GroupId,
        person_id: PersonId,
    ) -> Result<(), LarderError> {
        ractor::call!(self.actor, DbActorMessage::AddGroupMember, group_id, person_id)
            .map_err(rpc_failed("AddGroupMember"))?
    }

    pub async fn remove_group_member(
        &self,
        group_id: GroupId,
        person_id: PersonId,
    ) -> Result<bool, LarderError> {
        ractor::call!(self.actor, DbActorMessage::RemoveGroupMember, group_id, person_id)
            .map_err(rpc_failed("RemoveGroupMember"))?
    }

    pub async fn group_member_ids(&self, group_id: GroupId) -> Result<Vec<PersonId>, LarderError> {
        ractor::call!(self.actor, DbActorMessage::GroupMemberIds, group_id)
            .map_err(rpc_failed("GroupMemberIds"))?
    }

    pub async fn sign_individual(
        &self,
        create: IndividualSignatureCreate,
    ) -> Result<DbIndividualSignature, LarderError> {
        ractor::call!(self.actor, DbActorMessage::SignIndividual, create)
            .map_err(rpc_failed("SignIndividual"))?
    }

    pub async fn sign_corporate(
        &self,
        create: CorporateSignatureCreate,
    ) -> Result<DbCorporateSignature, LarderError> {
        ractor::call!(self.actor, DbActorMessage::SignCorporate, create)
            .map_err(rpc_failed("SignCorporate"))?
    }

    pub async fn list_individual_signatures(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<DbIndividualSignature>, LarderError> {
        ractor::call!(self.actor, DbActorMessage::ListIndividualSignatures, person_id)
            .map_err(rpc_failed("ListIndividualSignatures"))?
    }

    pub async fn agreement_status(&self, person_id: PersonId) -> Result<AgreementStatus, LarderError> {
        ractor::call!(self.actor, DbActorMessage::AgreementStatus, person_id)
            .map_err(rpc_failed("AgreementStatus"))?
    }

    pub async fn create_organization(&self, name: &str) -> Result<DbOrganization, LarderError> {
        ractor::call!(self.actor, DbActorMessage::CreateOrganization, name.to_string())
            .map_err(rpc_failed("CreateOrganization"))?
    }

    pub async fn upsert_contributor(
        &self,
        create: ContributorCreate,
    ) -> Result<DbContributor, LarderError> {
        ractor::call!(self.actor, DbActorMessage::UpsertContributor, create)
            .map_err(rpc_failed("UpsertContributor"))?
    }

    pub async fn find_contributor(
        &self,
        person_id: PersonId,
        organization_id: OrganizationId,
    ) -> Result<Option<DbContributor>, LarderError> {
        ractor::call!(
            self.actor,
            DbActorMessage::FindContributor,
            person_id,
            organization_id
        )
        .map_err(rpc_failed("FindContributor"))?
    }

    pub async fn record_commit_author(
        &self,
        login: &str,
        repository: &str,
    ) -> Result<DbCommitAuthor, LarderError> {
        ractor::call!(
            self.actor,
            DbActorMessage::RecordCommitAuthor,
            login.to_string(),
            repository.to_string()
        )
        .map_err(rpc_failed("RecordCommitAuthor"))?
    }

    pub async fn commit_authors_in_repository(
        &self,
        repository: &str,
    ) -> Result<Vec<DbCommitAuthor>, LarderError> {
        ractor::call!(
            self.actor,
            DbActorMessage::CommitAuthorsInRepository,
            repository.to_string()
        )
        .map_err(rpc_failed("CommitAuthorsInRepository"))?
    }

    pub async fn commit_authors_with_login(
        &self,
        login: &str,
    ) -> Result<Vec<DbCommitAuthor>, LarderError> {
        ractor::call!(
            self.actor,
            DbActorMessage::CommitAuthorsWithLogin,
            login.to_string()
        )
        .map_err(rpc_failed("CommitAuthorsWithLogin"))?
    }

    pub async fn create_resource(&self, create: ResourceCreate) -> Result<Resource, LarderError> {
        ractor::call!(self.actor, DbActorMessage::CreateResource, create)
            .map_err(rpc_failed("CreateResource"))?
    }

    pub async fn get_resource(
        &self,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Result<Resource, LarderError> {
        ractor::call!(self.actor, DbActorMessage::GetResource, kind, id)
            .map_err(rpc_failed("GetResource"))?
    }

    pub async fn list_collaborators(
        &self,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Result<Vec<Collaborator>, LarderError> {
        ractor::call!(self.actor, DbActorMessage::ListCollaborators, kind, id)
            .map_err(rpc_failed("ListCollaborators"))?
    }

    pub async fn get_collaborator(&self, id: CollaboratorId) -> Result<Collaborator, LarderError> {
        ractor::call!(self.actor, DbActorMessage::GetCollaborator, id)
            .map_err(rpc_failed("GetCollaborator"))?
    }

    pub async fn find_collaborator(
        &self,
        person_id: PersonId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Result<Option<Collaborator>, LarderError> {
        ractor::call!(self.actor, DbActorMessage::FindCollaborator, person_id, kind, id)
            .map_err(rpc_failed("FindCollaborator"))?
    }

    pub async fn create_collaborators(
        &self,
        batch: CollaboratorBatch,
    ) -> Result<Vec<Collaborator>, LarderError> {
        ractor::call!(self.actor, DbActorMessage::CreateCollaborators, batch)
            .map_err(rpc_failed("CreateCollaborators"))?
    }

    pub async fn remove_collaborator(
        &self,
        action: CollaboratorAction,
    ) -> Result<Collaborator, LarderError> {
        ractor::call!(self.actor, DbActorMessage::RemoveCollaborator, action)
            .map_err(rpc_failed("RemoveCollaborator"))?
    }

    pub async fn transfer_ownership(
        &self,
        action: CollaboratorAction,
    ) -> Result<Resource, LarderError> {
        ractor::call!(self.actor, DbActorMessage::TransferOwnership, action)
            .map_err(rpc_failed("TransferOwnership"))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::CreatePerson(create, reply) => {
                let _ = reply.send(self.create_person(pool, create).await);
            }
            DbActorMessage::GetPerson(id, reply) => {
                let _ = reply.send(self.get_person(pool, id).await);
            }
            DbActorMessage::ListPeople(reply) => {
                let _ = reply.send(self.list_people(pool).await);
            }
            DbActorMessage::LinkAccount(person_id, identity, reply) => {
                let _ = reply.send(self.link_account(pool, person_id, identity).await);
            }
            DbActorMessage::FindOrCreateFromIdentity(identity, reply) => {
                let _ = reply.send(self.find_or_create_from_identity(pool, identity).await);
            }
            DbActorMessage::FindAccount(person_id, provider, reply) => {
                let _ = reply.send(self.find_account(pool, person_id, &provider).await);
            }
            DbActorMessage::ListAccounts(person_id, reply) => {
                let _ = reply.send(self.list_accounts(pool, person_id).await);
            }
            DbActorMessage::FindPersonByLogin(provider, username, reply) => {
                let _ = reply.send(self.find_person_by_login(pool, &provider, &username).await);
            }
            DbActorMessage::UnlinkAccounts(person_id, reply) => {
                let _ = reply.send(self.unlink_accounts(pool, person_id).await);
            }
            DbActorMessage::CreateGroup(name, reply) => {
                let _ = reply.send(self.create_group(pool, &name).await);
            }
            DbActorMessage::AddGroupMember(group_id, person_id, reply) => {
                let _ = reply.send(self.add_group_member(pool, group_id, person_id).await);
            }
            DbActorMessage::RemoveGroupMember(group_id, person_id, reply) => {
                let _ = reply.send(self.remove_group_member(pool, group_id, person_id).await);
            }
            DbActorMessage::GroupMemberIds(group_id, reply) => {
                let _ = reply.send(self.group_member_ids(pool, group_id).await);
            }
            DbActorMessage::SignIndividual(create, reply) => {
                let _ = reply.send(self.sign_individual(pool, create).await);
            }
            DbActorMessage::SignCorporate(create, reply) => {
                let _ = reply.send(self.sign_corporate(pool, create).await);
            }
            DbActorMessage::ListIndividualSignatures(person_id, reply) => {
                let _ = reply.send(self.list_individual_signatures(pool, person_id).await);
            }
            DbActorMessage::AgreementStatus(person_id, reply) => {
                let _ = reply.send(self.agreement_status(pool, person_id).await);
            }
            DbActorMessage::CreateOrganization(name, reply) => {
                let _ = reply.send(self.create_organization(pool, &name).await);
            }
            DbActorMessage::UpsertContributor(create, reply) => {
                let _ = reply.send(self.upsert_contributor(pool, create).await);
            }
            DbActorMessage::FindContributor(person_id, organization_id, reply) => {
                let _ = reply.send(
                    self.find_contributor(pool, person_id, organization_id)
                        .await,
                );
            }
            DbActorMessage::RecordCommitAuthor(login, repository, reply) => {
                let _ = reply.send(self.record_commit_author(pool, &login, &repository).await);
            }
            DbActorMessage::CommitAuthorsInRepository(repository, reply) => {
                let _ = reply.send(self.commit_authors_in_repository(pool, &repository).await);
            }
            DbActorMessage::CommitAuthorsWithLogin(login, reply) => {
                let _ = reply.send(self.commit_authors_with_login(pool, &login).await);
            }
            DbActorMessage::CreateResource(create, reply) => {
                let _ = reply.send(self.create_resource(pool, create).await);
            }
            DbActorMessage::GetResource(kind, id, reply) => {
                let _ = reply.send(self.get_resource(pool, kind, id).await);
            }
            DbActorMessage::ListCollaborators(kind, id, reply) => {
                let _ = reply.send(self.list_collaborators(pool, kind, id).await);
            }
            DbActorMessage::GetCollaborator(id, reply) => {
                let _ = reply.send(self.get_collaborator(pool, id).await);
            }
            DbActorMessage::FindCollaborator(person_id, kind, id, reply) => {
                let _ = reply.send(self.find_collaborator(pool, person_id, kind, id).await);
            }
            DbActorMessage::CreateCollaborators(batch, reply) => {
                let _ = reply.send(self.create_collaborators(pool, batch).await);
            }
            DbActorMessage::RemoveCollaborator(action, reply) => {
                let _ = reply.send(self.remove_collaborator(pool, action).await);
            }
            DbActorMessage::TransferOwnership(action, reply) => {
                let _ = reply.send(self.transfer_ownership(pool, action).await);
            }
        }
        Ok(())
    }
}

// Reads use a pooled connection; writes open a transaction that is committed
// only when the whole operation succeeded (dropping it rolls back).
impl DbActor {
    async fn create_person(
        &self,
        pool: &SqlitePool,
        create: PersonCreate,
    ) -> Result<DbPerson, LarderError> {
        let mut tx = pool.begin().await?;
        let person = identity::insert_person(&mut tx, create).await?;
        tx.commit().await?;
        Ok(person)
    }

    async fn get_person(&self, pool: &SqlitePool, id: PersonId) -> Result<DbPerson, LarderError> {
        let mut conn = pool.acquire().await?;
        identity::get_person(&mut conn, id).await
    }

    async fn list_people(&self, pool: &SqlitePool) -> Result<Vec<DbPerson>, LarderError> {
        let mut conn = pool.acquire().await?;
        identity::list_people(&mut conn).await
    }

    async fn link_account(
        &self,
        pool: &SqlitePool,
        person_id: PersonId,
        external: ExternalIdentity,
    ) -> Result<DbAccount, LarderError> {
        let mut tx = pool.begin().await?;
        let account = identity::upsert_account(&mut tx, person_id, &external).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn find_or_create_from_identity(
        &self,
        pool: &SqlitePool,
        external: ExternalIdentity,
    ) -> Result<DbPerson, LarderError> {
        let mut tx = pool.begin().await?;
        let person = identity::find_or_create_from_identity(&mut tx, &external).await?;
        tx.commit().await?;
        Ok(person)
    }

    async fn find_account(
        &self,
        pool: &SqlitePool,
        person_id: PersonId,
        provider: &str,
    ) -> Result<Option<DbAccount>, LarderError> {
        let mut conn = pool.acquire().await?;
        identity::find_account(&mut conn, person_id, provider).await
    }

    async fn list_accounts(
        &self,
        pool: &SqlitePool,
        person_id: Option<PersonId>,
    ) -> Result<Vec<DbAccount>, LarderError> {
        let mut conn = pool.acquire().await?;
        identity::list_accounts(&mut conn, person_id).await
    }

    async fn find_person_by_login(
        &self,
        pool: &SqlitePool,
        provider: &str,
        username: &str,
    ) -> Result<Option<DbPerson>, LarderError> {
        let mut conn = pool.acquire().await?;
        identity::find_person_by_login(&mut conn, provider, username).await
    }

    async fn unlink_accounts(
        &self,
        pool: &SqlitePool,
        person_id: PersonId,
    ) -> Result<u64, LarderError> {
        let mut tx = pool.begin().await?;
        let removed = identity::unlink_accounts(&mut tx, person_id).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn create_group(&self, pool: &SqlitePool, name: &str) -> Result<DbGroup, LarderError> {
        let mut tx = pool.begin().await?;
        let group = membership::insert_group(&mut tx, name).await?;
        tx.commit().await?;
        Ok(group)
    }

    async fn add_group_member(
        &self,
        pool: &SqlitePool,
        group_id: GroupId,
        person_id: PersonId,
    ) -> Result<(), LarderError> {
        let mut tx = pool.begin().await?;
        membership::add_member(&mut tx, group_id, person_id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_group_member(
        &self,
        pool: &SqlitePool,
        group_id: GroupId,
        person_id: PersonId,
    ) -> Result<bool, LarderError> {
        let mut tx = pool.begin().await?;
        let removed = membership::remove_member(&mut tx, group_id, person_id).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn group_member_ids(
        &self,
        pool: &SqlitePool,
        group_id: GroupId,
    ) -> Result<Vec<PersonId>, LarderError> {
        let mut conn = pool.acquire().await?;
        membership::member_ids(&mut conn, group_id).await
    }

    async fn sign_individual(
        &self,
        pool: &SqlitePool,
        create: IndividualSignatureCreate,
    ) -> Result<DbIndividualSignature, LarderError> {
        let mut tx = pool.begin().await?;
        let sig = ledger::insert_individual_signature(&mut tx, create).await?;
        tx.commit().await?;
        Ok(sig)
    }

    async fn sign_corporate(
        &self,
        pool: &SqlitePool,
        create: CorporateSignatureCreate,
    ) -> Result<DbCorporateSignature, LarderError> {
        let mut tx = pool.begin().await?;
        let sig = ledger::insert_corporate_signature(&mut tx, create).await?;
        tx.commit().await?;
        Ok(sig)
    }

    async fn list_individual_signatures(
        &self,
        pool: &SqlitePool,
        person_id: PersonId,
    ) -> Result<Vec<DbIndividualSignature>, LarderError> {
        let mut conn = pool.acquire().await?;
        ledger::list_individual_signatures(&mut conn, person_id).await
    }

    async fn agreement_status(
        &self,
        pool: &SqlitePool,
        person_id: PersonId,
    ) -> Result<AgreementStatus, LarderError> {
        let mut conn = pool.acquire().await?;
        ledger::agreement_status(&mut conn, person_id).await
    }

    async fn create_organization(
        &self,
        pool: &SqlitePool,
        name: &str,
    ) -> Result<DbOrganization, LarderError> {
        let mut tx = pool.begin().await?;
        let org = ledger::insert_organization(&mut tx, name).await?;
        tx.commit().await?;
        Ok(org)
    }

    async fn upsert_contributor(
        &self,
        pool: &SqlitePool,
        create: ContributorCreate,
    ) -> Result<DbContributor, LarderError> {
        let mut tx = pool.begin().await?;
        let row = ledger::upsert_contributor(&mut tx, create).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn find_contributor(
        &self,
        pool: &SqlitePool,
        person_id: PersonId,
        organization_id: OrganizationId,
    ) -> Result<Option<DbContributor>, LarderError> {
        let mut conn = pool.acquire().await?;
        ledger::find_contributor(&mut conn, person_id, organization_id).await
    }

    async fn record_commit_author(
        &self,
        pool: &SqlitePool,
        login: &str,
        repository: &str,
    ) -> Result<DbCommitAuthor, LarderError> {
        let mut tx = pool.begin().await?;
        let row = commit_authors::upsert_commit_author(&mut tx, login, repository).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn commit_authors_in_repository(
        &self,
        pool: &SqlitePool,
        repository: &str,
    ) -> Result<Vec<DbCommitAuthor>, LarderError> {
        let mut conn = pool.acquire().await?;
        commit_authors::list_by_repository(&mut conn, repository).await
    }

    async fn commit_authors_with_login(
        &self,
        pool: &SqlitePool,
        login: &str,
    ) -> Result<Vec<DbCommitAuthor>, LarderError> {
        let mut conn = pool.acquire().await?;
        commit_authors::list_by_login(&mut conn, login).await
    }

    async fn create_resource(
        &self,
        pool: &SqlitePool,
        create: ResourceCreate,
    ) -> Result<Resource, LarderError> {
        let mut tx = pool.begin().await?;
        let resource = collaboration::insert_resource(&mut tx, create).await?;
        tx.commit().await?;
        Ok(resource)
    }

    async fn get_resource(
        &self,
        pool: &SqlitePool,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Result<Resource, LarderError> {
        let mut conn = pool.acquire().await?;
        collaboration::get_resource(&mut conn, kind, id).await
    }

    async fn list_collaborators(
        &self,
        pool: &SqlitePool,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Result<Vec<Collaborator>, LarderError> {
        let mut conn = pool.acquire().await?;
        collaboration::get_resource(&mut conn, kind, id).await?;
        collaboration::list_collaborators(&mut conn, kind, id).await
    }

    async fn get_collaborator(
        &self,
        pool: &SqlitePool,
        id: CollaboratorId,
    ) -> Result<Collaborator, LarderError> {
        let mut conn = pool.acquire().await?;
        collaboration::get_collaborator(&mut conn, id).await
    }

    async fn find_collaborator(
        &self,
        pool: &SqlitePool,
        person_id: PersonId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Result<Option<Collaborator>, LarderError> {
        let mut conn = pool.acquire().await?;
        collaboration::find_collaborator(&mut conn, person_id, kind, id).await
    }

    async fn create_collaborators(
        &self,
        pool: &SqlitePool,
        batch: CollaboratorBatch,
    ) -> Result<Vec<Collaborator>, LarderError> {
        let mut tx = pool.begin().await?;
        let created = collaboration::create_collaborators(&mut tx, batch).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn remove_collaborator(
        &self,
        pool: &SqlitePool,
        action: CollaboratorAction,
    ) -> Result<Collaborator, LarderError> {
        let mut tx = pool.begin().await?;
        let removed = collaboration::remove_collaborator(&mut tx, action).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn transfer_ownership(
        &self,
        pool: &SqlitePool,
        action: CollaboratorAction,
    ) -> Result<Resource, LarderError> {
        let mut tx = pool.begin().await?;
        let resource = collaboration::transfer_ownership(&mut tx, action).await?;
        tx.commit().await?;
        Ok(resource)
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), LarderError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
