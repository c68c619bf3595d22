use std::sync::Arc;
use tracing::info;

use crate::clients::StremioClient;
use crate::config::Config;
use crate::crypto::{CredentialCipher, KdfParams};
use crate::db::{KeyValueStore, Store};
use crate::services::{
    AccountService, DefaultAccountService, DefaultLibraryService, ExecutionPolicy, HealthProber,
    LibraryService, Vault,
};

/// Environment variable consulted when no master password flag is given.
pub const MASTER_PASSWORD_ENV: &str = "ADDONVAULT_MASTER_PASSWORD";

/// Persistence, remote client and vault; everything that exists before the
/// vault is unlocked.
pub struct AppContext {
    pub config: Config,

    pub store: Arc<Store>,

    pub api: Arc<StremioClient>,

    pub vault: Vault,
}

/// Services bound to an unlocked cipher.
#[derive(Clone)]
pub struct Services {
    pub accounts: Arc<dyn AccountService>,

    pub library: Arc<dyn LibraryService>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

impl AppContext {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(
            Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?,
        );

        let api = Arc::new(StremioClient::new(&config.remote)?);
        let vault = Vault::new(store.clone(), KdfParams::from(&config.security));

        Ok(Self {
            config,
            store,
            api,
            vault,
        })
    }

    /// Opens the vault in its configured mode and builds the services.
    pub async fn unlock(&self, master_password: Option<&str>) -> anyhow::Result<Services> {
        if self.config.security.master_password
            && !self.vault.has_master_password().await?
        {
            anyhow::bail!(
                "security.master_password is enabled but no master password is set; run `addonvault vault setup` first"
            );
        }

        let cipher = self.vault.open(master_password).await?;
        self.services(cipher).await
    }

    pub async fn services(&self, cipher: CredentialCipher) -> anyhow::Result<Services> {
        let store: Arc<dyn KeyValueStore> = self.store.clone();
        let policy = ExecutionPolicy::from(&self.config.updates);

        let accounts = DefaultAccountService::load(
            store.clone(),
            self.api.clone(),
            Arc::new(cipher),
            policy,
        )
        .await?;

        let prober = HealthProber::http(self.api.http_client().clone(), &self.config.health);
        let library =
            DefaultLibraryService::load(store, self.api.clone(), prober, policy).await?;

        info!("Vault unlocked");

        Ok(Services {
            accounts: Arc::new(accounts),
            library: Arc::new(library),
        })
    }
}
