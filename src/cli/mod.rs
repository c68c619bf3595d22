//! Command-line interface for `AddonVault`, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};

use crate::domain::{AccountId, ApiKeyId, SavedAddonId};
use crate::state::MASTER_PASSWORD_ENV;

/// AddonVault - manage addons across multiple streaming accounts
#[derive(Parser)]
#[command(name = "addonvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Master password, when the vault is protected by one
    #[arg(long, global = true, env = MASTER_PASSWORD_ENV, hide_env_values = true)]
    pub master_password: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage accounts
    #[command(alias = "acc")]
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Manage the addons installed on an account
    Addon {
        #[command(subcommand)]
        command: AddonCommands,
    },

    /// Manage service API keys stored with an account
    #[command(name = "apikey", alias = "key")]
    ApiKey {
        #[command(subcommand)]
        command: ApiKeyCommands,
    },

    /// Manage the saved-addon library
    #[command(alias = "lib")]
    Library {
        #[command(subcommand)]
        command: LibraryCommands,
    },

    /// Master password and data reset
    Vault {
        #[command(subcommand)]
        command: VaultCommands,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// List accounts
    #[command(alias = "ls")]
    List,

    /// Add an account from an existing auth key
    AddKey {
        auth_key: String,
        /// Display name
        #[arg(long)]
        name: String,
    },

    /// Add an account by logging in
    AddLogin {
        email: String,
        #[arg(long)]
        password: String,
        /// Display name (defaults to the email)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove an account
    #[command(alias = "rm")]
    Remove { id: AccountId },

    /// Refresh an account's addon collection
    Sync { id: AccountId },

    /// Refresh every account
    SyncAll,

    /// Rename an account or replace its credentials
    Update {
        id: AccountId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        auth_key: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Write all accounts to a JSON file
    Export {
        path: String,
        /// Include plaintext auth keys and passwords
        #[arg(long)]
        include_credentials: bool,
        /// Include the saved-addon library
        #[arg(long)]
        with_library: bool,
    },

    /// Import accounts from a JSON export
    Import { path: String },
}

#[derive(Subcommand)]
pub enum AddonCommands {
    /// List cached addons of an account
    #[command(alias = "ls")]
    List { account: AccountId },

    /// Install an addon from its transport URL
    Install { account: AccountId, url: String },

    /// Remove addons by manifest id
    #[command(alias = "rm")]
    Remove {
        account: AccountId,
        #[arg(required = true)]
        addon_ids: Vec<String>,
    },

    /// Set the addon order; every installed id must be listed once
    Reorder {
        account: AccountId,
        #[arg(required = true)]
        addon_ids: Vec<String>,
    },

    /// Re-fetch an addon's manifest from its URL
    Reinstall { account: AccountId, addon_id: String },

    /// Check installed addons for newer versions
    Updates { account: AccountId },

    /// Manage debrid keys embedded in addon URLs
    Debrid {
        #[command(subcommand)]
        command: DebridCommands,
    },
}

#[derive(Subcommand)]
pub enum DebridCommands {
    /// Apply a stored debrid key to one addon
    Apply {
        account: AccountId,
        addon_id: String,
        key_id: ApiKeyId,
    },

    /// Remove the debrid key from one addon
    #[command(alias = "rm")]
    Remove { account: AccountId, addon_id: String },

    /// Apply a stored debrid key to every addon of a type (e.g. torrentio)
    BulkApply {
        account: AccountId,
        addon_type: String,
        key_id: ApiKeyId,
    },

    /// Remove debrid keys from every addon of a type
    BulkRemove { account: AccountId, addon_type: String },

    /// List addon types that support debrid keys
    Types,
}

#[derive(Subcommand)]
pub enum ApiKeyCommands {
    /// List API keys of an account (values hidden)
    #[command(alias = "ls")]
    List { account: AccountId },

    /// Store a new API key
    Add {
        account: AccountId,
        /// Service id, e.g. realdebrid, alldebrid, tmdb
        service: String,
        api_key: String,
        #[arg(long)]
        label: Option<String>,
    },

    /// Replace the value or label of a key
    Update {
        account: AccountId,
        key_id: ApiKeyId,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        label: Option<String>,
    },

    /// Delete an API key
    #[command(alias = "rm")]
    Remove { account: AccountId, key_id: ApiKeyId },

    /// Print the decrypted key
    Reveal { account: AccountId, key_id: ApiKeyId },
}

#[derive(Subcommand)]
pub enum LibraryCommands {
    /// List saved addons
    #[command(alias = "ls")]
    List {
        /// Only entries carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Save an addon configuration from its URL
    Add {
        name: String,
        url: String,
        /// Comma or space separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Rename or retag a saved addon
    Update {
        id: SavedAddonId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a saved addon
    #[command(alias = "rm")]
    Remove { id: SavedAddonId },

    /// List every tag in use
    Tags,

    /// Apply saved addons to an account
    Apply {
        account: AccountId,
        #[arg(required = true)]
        ids: Vec<SavedAddonId>,
        /// Never replace addons that are already installed
        #[arg(long)]
        add_only: bool,
        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Probe every saved addon and store the results
    Health,

    /// Check saved addons for newer manifest versions
    Updates,
}

#[derive(Subcommand)]
pub enum VaultCommands {
    /// Show whether a master password is configured
    Status,

    /// Protect the vault with a master password
    Setup {
        #[arg(long)]
        password: String,
    },

    /// Forgotten password: erase all data and set a new master password
    Reset {
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        yes: bool,
    },

    /// Erase all stored data
    Wipe {
        #[arg(long)]
        yes: bool,
    },
}

pub use commands::*;
