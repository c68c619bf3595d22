//! Vault command handlers

use crate::services::WipeReport;
use crate::state::AppContext;

fn confirmed(yes: bool, prompt: &str) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }

    println!("{prompt}");
    println!("Enter 'y' to confirm, anything else to cancel:");

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_wipe(report: &WipeReport) {
    println!("✓ Removed {} stored key(s)", report.removed.len());
    for (key, error) in &report.failed {
        println!("✗ {key}: {error}");
    }
}

pub async fn cmd_vault_status(ctx: &AppContext) -> anyhow::Result<()> {
    if ctx.vault.has_master_password().await? {
        println!("Vault is protected by a master password.");
    } else {
        println!("Vault uses the device key (no master password).");
    }
    Ok(())
}

pub async fn cmd_vault_setup(ctx: &AppContext, password: &str) -> anyhow::Result<()> {
    ctx.vault.setup_master_password(password).await?;
    println!("✓ Master password configured.");
    Ok(())
}

pub async fn cmd_vault_reset(ctx: &AppContext, new_password: &str, yes: bool) -> anyhow::Result<()> {
    if !confirmed(
        yes,
        "This erases every account, API key and saved addon before setting a new master password.",
    )? {
        println!("Cancelled.");
        return Ok(());
    }

    let (_, report) = ctx.vault.reset(new_password).await?;
    print_wipe(&report);
    println!("✓ New master password configured.");
    Ok(())
}

pub async fn cmd_vault_wipe(ctx: &AppContext, yes: bool) -> anyhow::Result<()> {
    if !confirmed(yes, "This erases every account, API key and saved addon.")? {
        println!("Cancelled.");
        return Ok(());
    }

    let report = ctx.vault.wipe_all().await;
    print_wipe(&report);
    if !report.is_complete() {
        anyhow::bail!("Some data could not be removed");
    }
    Ok(())
}
