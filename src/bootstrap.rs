use crate::collaboration::CollaborationManager;
use crate::commit_authors::CommitAuthorResolver;
use crate::config::Config;
use crate::db::DbActorHandle;
use crate::identity::IdentityStore;
use crate::ledger::AgreementLedger;
use crate::membership::GroupDirectory;
use crate::notify::NotificationQueue;
use larder_schema::CollaboratorAssigned;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Aggregates the component services over one database actor.
///
/// Keep this as a simple struct so wiring stays visible at compile time.
#[derive(Clone)]
pub struct Larder {
    pub db: DbActorHandle,
    pub identity: IdentityStore,
    pub ledger: AgreementLedger,
    pub groups: GroupDirectory,
    pub commit_authors: CommitAuthorResolver,
    pub collaboration: CollaborationManager,
}

impl Larder {
    /// Wire every service. The receiver is the outbound end of the notification queue.
    pub fn new(
        db: DbActorHandle,
        cfg: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<CollaboratorAssigned>) {
        let identity_cfg = Arc::new(cfg.identity.clone());
        let search_cfg = Arc::new(cfg.search.clone());

        info!(
            handle_provider = %identity_cfg.handle_provider,
            source_control_provider = %identity_cfg.source_control_provider,
            similarity_threshold = search_cfg.similarity_threshold,
            search_limit = search_cfg.limit,
            "Larder config (effective)"
        );

        let (notifications, rx) = NotificationQueue::channel();
        let identity = IdentityStore::new(db.clone(), identity_cfg, search_cfg.clone());
        let ledger = AgreementLedger::new(db.clone());
        let groups = GroupDirectory::new(db.clone());
        let commit_authors = CommitAuthorResolver::new(db.clone(), identity.clone(), ledger.clone());
        let collaboration = CollaborationManager::new(
            db.clone(),
            identity.clone(),
            Arc::new(groups.clone()),
            notifications,
            search_cfg,
        );

        let larder = Self {
            db,
            identity,
            ledger,
            groups,
            commit_authors,
            collaboration,
        };
        (larder, rx)
    }

    /// Spawn the database actor for `cfg.basic.database_url` and wire every service.
    pub async fn spawn(cfg: &Config) -> (Self, mpsc::UnboundedReceiver<CollaboratorAssigned>) {
        let db = crate::db::spawn(&cfg.basic.database_url).await;
        Self::new(db, cfg)
    }
}
