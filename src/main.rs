use larder::Larder;
use larder::config::Config;
use mimalloc::MiMalloc;
use tokio::signal;
use tracing::info;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_toml();
    larder::utils::logging::init(&cfg.basic.loglevel);

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        "Larder starting"
    );

    let (_larder, mut notifications) = Larder::spawn(&cfg).await;

    // Delivery is owned elsewhere; this worker only drains obligations into the log.
    let drain = tokio::spawn(async move {
        while let Some(event) = notifications.recv().await {
            info!(
                resource = %event.resource,
                collaborator_person_id = event.collaborator_person_id,
                owner_person_id = event.owner_person_id,
                queued_at = %event.queued_at,
                "collaborator notification ready for delivery"
            );
        }
    });

    shutdown_signal().await;
    drain.abort();
    info!("Larder has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
