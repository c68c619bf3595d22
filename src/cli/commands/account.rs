//! Account command handlers

use anyhow::Context;

use crate::domain::AccountId;
use crate::services::AccountUpdate;
use crate::state::Services;

pub async fn cmd_account_list(services: &Services) -> anyhow::Result<()> {
    let accounts = services.accounts.list_accounts().await;

    if accounts.is_empty() {
        println!("No accounts yet.");
        println!();
        println!("Add one with: addonvault account add-login <email> --password <password>");
        return Ok(());
    }

    println!("Accounts ({} total)", accounts.len());
    println!("{:-<70}", "");

    for account in accounts {
        let status_indicator = match account.status.as_str() {
            "active" => "✓",
            _ => "✗",
        };

        println!("{} {} [{} addons]", status_indicator, account.name, account.addons.len());
        println!(
            "  ID: {} | Email: {} | Last sync: {}",
            account.id,
            account.email.as_deref().unwrap_or("-"),
            account.last_sync.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub async fn cmd_account_add_key(
    services: &Services,
    auth_key: &str,
    name: &str,
) -> anyhow::Result<()> {
    let account = services
        .accounts
        .add_account_by_auth_key(auth_key, name)
        .await?;
    println!(
        "✓ Added '{}' ({} addons). ID: {}",
        account.name,
        account.addons.len(),
        account.id
    );
    Ok(())
}

pub async fn cmd_account_add_login(
    services: &Services,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let account = services
        .accounts
        .add_account_by_credentials(email, password, name)
        .await?;
    println!(
        "✓ Added '{}' ({} addons). ID: {}",
        account.name,
        account.addons.len(),
        account.id
    );
    Ok(())
}

pub async fn cmd_account_remove(services: &Services, id: AccountId) -> anyhow::Result<()> {
    let account = services.accounts.get_account(id).await?;

    println!("Remove account '{}' (ID: {})?", account.name, account.id);
    println!("Enter 'y' to confirm, anything else to cancel:");

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim().eq_ignore_ascii_case("y") {
        services.accounts.remove_account(id).await?;
        println!("✓ Removed: {}", account.name);
    } else {
        println!("Cancelled.");
    }

    Ok(())
}

pub async fn cmd_account_sync(services: &Services, id: AccountId) -> anyhow::Result<()> {
    let account = services.accounts.sync_account(id).await?;
    println!("✓ Synced '{}': {} addons", account.name, account.addons.len());
    Ok(())
}

pub async fn cmd_account_sync_all(services: &Services) -> anyhow::Result<()> {
    let report = services.accounts.sync_all().await?;

    println!("✓ Synced {} account(s)", report.synced.len());
    for (id, error) in &report.failed {
        println!("✗ {id}: {error}");
    }

    Ok(())
}

pub async fn cmd_account_update(
    services: &Services,
    id: AccountId,
    update: AccountUpdate,
) -> anyhow::Result<()> {
    let account = services.accounts.update_account(id, update).await?;
    println!("✓ Updated '{}' (status: {})", account.name, account.status.as_str());
    Ok(())
}

pub async fn cmd_account_export(
    services: &Services,
    path: &str,
    include_credentials: bool,
    with_library: bool,
) -> anyhow::Result<()> {
    let saved = if with_library {
        Some(services.library.list().await)
    } else {
        None
    };

    let export = services
        .accounts
        .export_accounts(include_credentials, saved)
        .await?;
    let json = serde_json::to_string_pretty(&export)?;

    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write export file {path}"))?;

    println!("✓ Exported {} account(s) to {path}", export.accounts.len());
    if include_credentials {
        println!("⚠ The file contains plaintext credentials. Keep it safe.");
    }
    Ok(())
}

pub async fn cmd_account_import(services: &Services, path: &str) -> anyhow::Result<()> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read import file {path}"))?;

    let summary = services.accounts.import_accounts(&json).await?;
    let library_added = services.library.import(summary.saved_addons).await?;

    println!("✓ Imported {} account(s)", summary.imported.len());
    if library_added > 0 {
        println!("✓ Added {library_added} saved addon(s) to the library");
    }
    for id in &summary.without_credentials {
        println!("⚠ {id} has no credentials; run `addonvault account update {id}`");
    }

    Ok(())
}
