pub mod addons;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{
    AccountCommands, AddonCommands, ApiKeyCommands, Cli, Commands, DebridCommands,
    LibraryCommands, VaultCommands,
};
pub use config::Config;
use services::AccountUpdate;
use state::AppContext;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists.");
        }
        return Ok(());
    }

    let ctx = AppContext::new(config).await?;
    info!(database = %ctx.config.general.database_path, "Store ready");

    if let Commands::Vault { command } = command {
        return run_vault(&ctx, command).await;
    }

    let services = ctx.unlock(cli.master_password.as_deref()).await?;

    match command {
        Commands::Account { command } => match command {
            AccountCommands::List => cli::cmd_account_list(&services).await,
            AccountCommands::AddKey { auth_key, name } => {
                cli::cmd_account_add_key(&services, &auth_key, &name).await
            }
            AccountCommands::AddLogin {
                email,
                password,
                name,
            } => cli::cmd_account_add_login(&services, &email, &password, name.as_deref()).await,
            AccountCommands::Remove { id } => cli::cmd_account_remove(&services, id).await,
            AccountCommands::Sync { id } => cli::cmd_account_sync(&services, id).await,
            AccountCommands::SyncAll => cli::cmd_account_sync_all(&services).await,
            AccountCommands::Update {
                id,
                name,
                auth_key,
                email,
                password,
            } => {
                let update = AccountUpdate {
                    name,
                    auth_key,
                    email,
                    password,
                };
                cli::cmd_account_update(&services, id, update).await
            }
            AccountCommands::Export {
                path,
                include_credentials,
                with_library,
            } => cli::cmd_account_export(&services, &path, include_credentials, with_library).await,
            AccountCommands::Import { path } => cli::cmd_account_import(&services, &path).await,
        },

        Commands::Addon { command } => match command {
            AddonCommands::List { account } => cli::cmd_addon_list(&services, account).await,
            AddonCommands::Install { account, url } => {
                cli::cmd_addon_install(&services, account, &url).await
            }
            AddonCommands::Remove { account, addon_ids } => {
                cli::cmd_addon_remove(&services, account, &addon_ids).await
            }
            AddonCommands::Reorder { account, addon_ids } => {
                cli::cmd_addon_reorder(&services, account, &addon_ids).await
            }
            AddonCommands::Reinstall { account, addon_id } => {
                cli::cmd_addon_reinstall(&services, account, &addon_id).await
            }
            AddonCommands::Updates { account } => cli::cmd_addon_updates(&services, account).await,
            AddonCommands::Debrid { command } => match command {
                DebridCommands::Apply {
                    account,
                    addon_id,
                    key_id,
                } => cli::cmd_debrid_apply(&services, account, &addon_id, key_id).await,
                DebridCommands::Remove { account, addon_id } => {
                    cli::cmd_debrid_remove(&services, account, &addon_id).await
                }
                DebridCommands::BulkApply {
                    account,
                    addon_type,
                    key_id,
                } => cli::cmd_debrid_bulk_apply(&services, account, &addon_type, key_id).await,
                DebridCommands::BulkRemove {
                    account,
                    addon_type,
                } => cli::cmd_debrid_bulk_remove(&services, account, &addon_type).await,
                DebridCommands::Types => {
                    cli::cmd_debrid_types();
                    Ok(())
                }
            },
        },

        Commands::ApiKey { command } => match command {
            ApiKeyCommands::List { account } => cli::cmd_apikey_list(&services, account).await,
            ApiKeyCommands::Add {
                account,
                service,
                api_key,
                label,
            } => cli::cmd_apikey_add(&services, account, &service, &api_key, label).await,
            ApiKeyCommands::Update {
                account,
                key_id,
                api_key,
                label,
            } => cli::cmd_apikey_update(&services, account, key_id, api_key, label).await,
            ApiKeyCommands::Remove { account, key_id } => {
                cli::cmd_apikey_remove(&services, account, key_id).await
            }
            ApiKeyCommands::Reveal { account, key_id } => {
                cli::cmd_apikey_reveal(&services, account, key_id).await
            }
        },

        Commands::Library { command } => match command {
            LibraryCommands::List { tag } => cli::cmd_library_list(&services, tag.as_deref()).await,
            LibraryCommands::Add { name, url, tags } => {
                cli::cmd_library_add(&services, &name, &url, &tags).await
            }
            LibraryCommands::Update { id, name, tags } => {
                cli::cmd_library_update(&services, id, name.as_deref(), tags.as_deref()).await
            }
            LibraryCommands::Remove { id } => cli::cmd_library_remove(&services, id).await,
            LibraryCommands::Tags => cli::cmd_library_tags(&services).await,
            LibraryCommands::Apply {
                account,
                ids,
                add_only,
                dry_run,
            } => cli::cmd_library_apply(&services, account, &ids, add_only, dry_run).await,
            LibraryCommands::Health => cli::cmd_library_health(&services).await,
            LibraryCommands::Updates => cli::cmd_library_updates(&services).await,
        },

        Commands::Init | Commands::Vault { .. } => Ok(()),
    }
}

async fn run_vault(ctx: &AppContext, command: VaultCommands) -> anyhow::Result<()> {
    match command {
        VaultCommands::Status => cli::cmd_vault_status(ctx).await,
        VaultCommands::Setup { password } => cli::cmd_vault_setup(ctx, &password).await,
        VaultCommands::Reset { new_password, yes } => {
            cli::cmd_vault_reset(ctx, &new_password, yes).await
        }
        VaultCommands::Wipe { yes } => cli::cmd_vault_wipe(ctx, yes).await,
    }
}
