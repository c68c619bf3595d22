use crate::domain::{AccountId, ApiKeyId, ApiService};
use crate::models::{ApiKeyInput, ApiKeyUpdate};
use crate::state::Services;

pub async fn cmd_apikey_list(services: &Services, account: AccountId) -> anyhow::Result<()> {
    let account = services.accounts.get_account(account).await?;

    if account.api_keys().is_empty() {
        println!("No API keys stored for '{}'.", account.name);
        return Ok(());
    }

    for key in account.api_keys() {
        let kind = if key.service.is_debrid() { "debrid" } else { "api" };
        println!(
            "{} {:<12} {:<20} [{}] added {}",
            key.id,
            key.service,
            key.label.as_deref().unwrap_or("-"),
            kind,
            key.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

pub async fn cmd_apikey_add(
    services: &Services,
    account: AccountId,
    service: &str,
    api_key: &str,
    label: Option<String>,
) -> anyhow::Result<()> {
    let input = ApiKeyInput {
        service: ApiService::from(service),
        api_key: api_key.to_string(),
        label,
        metadata: None,
    };

    let key = services.accounts.add_api_key(account, input).await?;
    println!("✓ Stored {} key. ID: {}", key.service, key.id);
    Ok(())
}

pub async fn cmd_apikey_update(
    services: &Services,
    account: AccountId,
    key_id: ApiKeyId,
    api_key: Option<String>,
    label: Option<String>,
) -> anyhow::Result<()> {
    let update = ApiKeyUpdate {
        api_key,
        label,
        metadata: None,
    };

    let key = services
        .accounts
        .update_api_key(account, key_id, update)
        .await?;
    println!("✓ Updated {} key {}", key.service, key.id);
    Ok(())
}

pub async fn cmd_apikey_remove(
    services: &Services,
    account: AccountId,
    key_id: ApiKeyId,
) -> anyhow::Result<()> {
    services.accounts.remove_api_key(account, key_id).await?;
    println!("✓ Removed key {key_id}");
    Ok(())
}

pub async fn cmd_apikey_reveal(
    services: &Services,
    account: AccountId,
    key_id: ApiKeyId,
) -> anyhow::Result<()> {
    let secret = zeroize::Zeroizing::new(services.accounts.reveal_api_key(account, key_id).await?);
    println!("{}", secret.as_str());
    Ok(())
}
