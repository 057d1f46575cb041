#![allow(dead_code)]

use larder::Larder;
use larder::config::Config;
use larder::db::DbPerson;
use larder_schema::{CollaboratorAssigned, ExternalIdentity};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::UnboundedReceiver;

/// A core wired to a throwaway SQLite file; call `cleanup` at the end of the test.
pub struct TestLarder {
    pub larder: Larder,
    pub notifications: UnboundedReceiver<CollaboratorAssigned>,
    db_path: PathBuf,
}

pub async fn spawn(tag: &str) -> TestLarder {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "larder-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let mut cfg = Config::default();
    cfg.basic.database_url = format!("sqlite:{}", db_path.display());

    let (larder, notifications) = Larder::spawn(&cfg).await;
    TestLarder {
        larder,
        notifications,
        db_path,
    }
}

impl TestLarder {
    pub async fn person(&self, name: &str) -> DbPerson {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        self.larder
            .identity
            .create_person(name, &email)
            .await
            .expect("person created")
    }

    /// Drain and count queued notifications.
    pub fn queued_notifications(&mut self) -> Vec<CollaboratorAssigned> {
        let mut events = Vec::new();
        while let Ok(event) = self.notifications.try_recv() {
            events.push(event);
        }
        events
    }

    pub async fn cleanup(self) {
        let wal_path = PathBuf::from(format!("{}-wal", self.db_path.to_string_lossy()));
        let shm_path = PathBuf::from(format!("{}-shm", self.db_path.to_string_lossy()));
        let _ = tokio::fs::remove_file(&wal_path).await;
        let _ = tokio::fs::remove_file(&shm_path).await;
        let _ = tokio::fs::remove_file(&self.db_path).await;
    }
}

pub fn identity(provider: &str, uid: &str, username: &str) -> ExternalIdentity {
    ExternalIdentity {
        provider: provider.to_string(),
        external_uid: uid.to_string(),
        username: username.to_string(),
        token: format!("token-{uid}"),
        display_name: None,
        email: None,
    }
}
