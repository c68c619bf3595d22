//! Saved-addon library command handlers

use std::io::Write;

use crate::domain::{AccountId, SavedAddonId};
use crate::models::{MergeResult, MergeStrategy, SavedAddon};
use crate::services::{health_summary, normalize_tag};
use crate::state::Services;

/// Splits comma or whitespace separated tags and normalizes each one.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(normalize_tag)
        .filter(|t| !t.is_empty())
        .collect()
}

fn print_merge(result: &MergeResult) {
    for added in &result.added {
        println!("  + {} ({})", added.name, added.addon_id);
    }
    for updated in &result.updated {
        println!("  ~ {} ({} → {})", updated.addon_id, updated.old_url, updated.new_url);
    }
    for skipped in &result.skipped {
        println!("  - {} skipped: {:?}", skipped.addon_id, skipped.reason);
    }
    for protected in &result.protected {
        println!("  🔒 {} ({}) is protected", protected.name, protected.addon_id);
    }
}

pub async fn cmd_library_list(services: &Services, tag: Option<&str>) -> anyhow::Result<()> {
    let saved: Vec<SavedAddon> = services
        .library
        .list()
        .await
        .into_iter()
        .filter(|s| tag.is_none_or(|t| s.tags.iter().any(|x| x == t)))
        .collect();

    if saved.is_empty() {
        println!("No saved addons.");
        return Ok(());
    }

    let summary = health_summary(&saved);
    println!(
        "Saved addons ({} total, {} online, {} offline, {} unchecked)",
        saved.len(),
        summary.online,
        summary.offline,
        summary.unchecked
    );
    println!("{:-<70}", "");

    for entry in saved {
        let status = match entry.health {
            Some(h) if h.is_online => "🟢",
            Some(_) => "🔴",
            None => "•",
        };
        println!("{} {} ({} v{})", status, entry.name, entry.manifest.name, entry.manifest.version);
        println!("  ID: {} | Tags: {}", entry.id, entry.tags.join(", "));
    }

    Ok(())
}

pub async fn cmd_library_add(
    services: &Services,
    name: &str,
    url: &str,
    tags: &str,
) -> anyhow::Result<()> {
    let saved = services.library.create(name, url, &parse_tags(tags)).await?;
    println!("✓ Saved '{}' ({}). ID: {}", saved.name, saved.manifest.name, saved.id);
    Ok(())
}

pub async fn cmd_library_update(
    services: &Services,
    id: SavedAddonId,
    name: Option<&str>,
    tags: Option<&str>,
) -> anyhow::Result<()> {
    let tags = tags.map(parse_tags);
    let saved = services.library.update(id, name, tags.as_deref()).await?;
    println!("✓ Updated '{}'", saved.name);
    Ok(())
}

pub async fn cmd_library_remove(services: &Services, id: SavedAddonId) -> anyhow::Result<()> {
    services.library.delete(id).await?;
    println!("✓ Removed saved addon {id}");
    Ok(())
}

pub async fn cmd_library_tags(services: &Services) -> anyhow::Result<()> {
    for tag in services.library.all_tags().await {
        println!("{tag}");
    }
    Ok(())
}

pub async fn cmd_library_apply(
    services: &Services,
    account: AccountId,
    ids: &[SavedAddonId],
    add_only: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut saved = Vec::with_capacity(ids.len());
    for id in ids {
        saved.push(services.library.get(*id).await?);
    }

    let strategy = if add_only {
        MergeStrategy::AddOnly
    } else {
        MergeStrategy::ReplaceMatching
    };

    if dry_run {
        let preview = services
            .accounts
            .preview_saved_addons(account, &saved, strategy)
            .await?;
        println!("Preview ({} saved addons):", preview.total());
        print_merge(&preview);
        return Ok(());
    }

    let result = services
        .accounts
        .apply_saved_addons(account, &saved, strategy)
        .await?;
    services.library.mark_used(ids).await?;

    println!(
        "✓ Applied: {} added, {} updated, {} skipped, {} protected",
        result.added.len(),
        result.updated.len(),
        result.skipped.len(),
        result.protected.len()
    );
    print_merge(&result);
    Ok(())
}

pub async fn cmd_library_health(services: &Services) -> anyhow::Result<()> {
    let mut on_progress = |done: usize, total: usize| {
        print!("\rChecking {done}/{total}");
        std::io::stdout().flush().ok();
    };

    let summary = services.library.check_health(&mut on_progress).await?;
    println!();
    println!(
        "✓ {} online, {} offline, {} unchecked",
        summary.online, summary.offline, summary.unchecked
    );
    Ok(())
}

pub async fn cmd_library_updates(services: &Services) -> anyhow::Result<()> {
    let updates = services.library.check_updates().await;
    let available: Vec<_> = updates.into_iter().filter(|u| u.has_update).collect();

    if available.is_empty() {
        println!("Saved addons are up to date.");
        return Ok(());
    }

    for update in available {
        println!(
            "  {} {} → {}",
            update.name, update.installed_version, update.latest_version
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_space_separated_tags() {
        assert_eq!(parse_tags("RD, 4K anime,,"), vec!["rd", "4k", "anime"]);
        assert!(parse_tags("").is_empty());
    }
}
