use crate::config::TransferConfig;
use crate::services::remote_store::{RemoteStore, create_store};
use std::sync::Arc;
use tracing::info;

pub fn setup_store(config: &TransferConfig) -> anyhow::Result<Arc<dyn RemoteStore>> {
    let store = create_store(&config.store_backend, config)?;

    match store.provider_id() {
        "local" => info!(
            "🗄️  Local store: {}",
            config.local_store_dir.display()
        ),
        provider => info!("☁️  Remote store: {}", provider),
    }

    Ok(store.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_local_store() {
        let config = TransferConfig::local("/tmp/drive_shuttle_setup");
        let store = setup_store(&config).unwrap();
        assert_eq!(store.provider_id(), "local");
    }

    #[test]
    fn test_setup_unknown_backend() {
        let config = TransferConfig {
            store_backend: "ftp".to_string(),
            ..Default::default()
        };
        assert!(setup_store(&config).is_err());
    }
}
