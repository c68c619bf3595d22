mod account;
mod addon;
mod apikey;
mod library;
mod vault;

pub use account::{
    cmd_account_add_key, cmd_account_add_login, cmd_account_export, cmd_account_import,
    cmd_account_list, cmd_account_remove, cmd_account_sync, cmd_account_sync_all,
    cmd_account_update,
};
pub use addon::{
    cmd_addon_install, cmd_addon_list, cmd_addon_reinstall, cmd_addon_remove, cmd_addon_reorder,
    cmd_addon_updates, cmd_debrid_apply, cmd_debrid_bulk_apply, cmd_debrid_bulk_remove,
    cmd_debrid_remove, cmd_debrid_types,
};
pub use apikey::{
    cmd_apikey_add, cmd_apikey_list, cmd_apikey_remove, cmd_apikey_reveal, cmd_apikey_update,
};
pub use library::{
    cmd_library_add, cmd_library_apply, cmd_library_health, cmd_library_list,
    cmd_library_remove, cmd_library_tags, cmd_library_update, cmd_library_updates, parse_tags,
};
pub use vault::{cmd_vault_reset, cmd_vault_setup, cmd_vault_status, cmd_vault_wipe};
