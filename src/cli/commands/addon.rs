//! Addon and debrid command handlers

use crate::domain::{AccountId, ApiKeyId};
use crate::models::AddonDescriptor;
use crate::services::{BulkDebridResult, DebridKeyApplier};
use crate::state::Services;

fn print_addons(addons: &[AddonDescriptor]) {
    let applier = DebridKeyApplier::default();

    for (index, addon) in addons.iter().enumerate() {
        let lock = if addon.is_protected() { " 🔒" } else { "" };
        let debrid = applier
            .current_service(addon)
            .map(|service| format!(" [{}]", service.display_name()))
            .unwrap_or_default();
        println!(
            "{:>3}. {} v{}{}{}",
            index + 1,
            addon.manifest.name,
            addon.manifest.version,
            debrid,
            lock
        );
        println!("     ID: {} | {}", addon.manifest.id, addon.transport_url);
    }
}

fn print_bulk(result: &BulkDebridResult) {
    println!("✓ Updated {} addon(s), {} failed", result.success, result.failed);
    for error in &result.errors {
        println!("  ✗ {error}");
    }
}

pub async fn cmd_addon_list(services: &Services, account: AccountId) -> anyhow::Result<()> {
    let account = services.accounts.get_account(account).await?;

    println!(
        "{} ({} addons, last sync {})",
        account.name,
        account.addons.len(),
        account.last_sync.format("%Y-%m-%d %H:%M")
    );
    println!("{:-<70}", "");
    print_addons(&account.addons);
    Ok(())
}

pub async fn cmd_addon_install(
    services: &Services,
    account: AccountId,
    url: &str,
) -> anyhow::Result<()> {
    let addons = services.accounts.install_addon(account, url).await?;
    println!("✓ Installed. Account now has {} addons.", addons.len());
    Ok(())
}

pub async fn cmd_addon_remove(
    services: &Services,
    account: AccountId,
    addon_ids: &[String],
) -> anyhow::Result<()> {
    let outcome = services.accounts.remove_addons(account, addon_ids).await?;

    for id in &outcome.removed {
        println!("✓ Removed {id}");
    }
    for id in &outcome.protected {
        println!("🔒 Kept protected addon {id}");
    }
    if outcome.removed.is_empty() && outcome.protected.is_empty() {
        println!("No matching addons installed.");
    }
    Ok(())
}

pub async fn cmd_addon_reorder(
    services: &Services,
    account: AccountId,
    addon_ids: &[String],
) -> anyhow::Result<()> {
    let addons = services.accounts.reorder_addons(account, addon_ids).await?;
    println!("✓ New order:");
    print_addons(&addons);
    Ok(())
}

pub async fn cmd_addon_reinstall(
    services: &Services,
    account: AccountId,
    addon_id: &str,
) -> anyhow::Result<()> {
    let outcome = services.accounts.reinstall_addon(account, addon_id).await?;

    match (outcome.previous_version, outcome.new_version) {
        (Some(previous), Some(new)) => println!("✓ Reinstalled {addon_id}: {previous} → {new}"),
        _ => println!("🔒 {addon_id} is protected and was left as is"),
    }
    Ok(())
}

pub async fn cmd_addon_updates(services: &Services, account: AccountId) -> anyhow::Result<()> {
    let updates = services.accounts.check_addon_updates(account).await?;
    let available: Vec<_> = updates.iter().filter(|u| u.has_update).collect();

    if available.is_empty() {
        println!("All {} checked addons are up to date.", updates.len());
        return Ok(());
    }

    println!("Updates available ({}):", available.len());
    for update in available {
        println!(
            "  {} {} → {} ({})",
            update.name, update.installed_version, update.latest_version, update.addon_id
        );
    }
    Ok(())
}

pub async fn cmd_debrid_apply(
    services: &Services,
    account: AccountId,
    addon_id: &str,
    key_id: ApiKeyId,
) -> anyhow::Result<()> {
    let addon = services
        .accounts
        .apply_debrid_key(account, addon_id, key_id)
        .await?;
    println!("✓ Debrid key applied to {}", addon.manifest.name);
    Ok(())
}

pub async fn cmd_debrid_remove(
    services: &Services,
    account: AccountId,
    addon_id: &str,
) -> anyhow::Result<()> {
    let addon = services.accounts.remove_debrid_key(account, addon_id).await?;
    println!("✓ Debrid key removed from {}", addon.manifest.name);
    Ok(())
}

pub async fn cmd_debrid_bulk_apply(
    services: &Services,
    account: AccountId,
    addon_type: &str,
    key_id: ApiKeyId,
) -> anyhow::Result<()> {
    let Some(type_name) = DebridKeyApplier::default().type_name(addon_type) else {
        anyhow::bail!("Unknown addon type '{addon_type}'; see `addonvault addon debrid types`");
    };
    println!("Applying key to {type_name} addons...");

    let result = services
        .accounts
        .bulk_apply_debrid_key(account, addon_type, key_id)
        .await?;
    print_bulk(&result);
    Ok(())
}

pub async fn cmd_debrid_bulk_remove(
    services: &Services,
    account: AccountId,
    addon_type: &str,
) -> anyhow::Result<()> {
    let result = services
        .accounts
        .bulk_remove_debrid(account, addon_type)
        .await?;
    print_bulk(&result);
    Ok(())
}

pub fn cmd_debrid_types() {
    let applier = DebridKeyApplier::default();
    println!("Addon types with debrid support:");
    for (key, name) in applier.supported_types() {
        println!("  {key:<12} {name}");
    }
}
