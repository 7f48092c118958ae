use serde::Serialize;

use crate::types::{AdminSummary, FlagBits, GroupSummary, OverrideKind};

use super::{CacheArgs, init_cache};

#[derive(Serialize)]
struct OverrideOutput {
    target: String,
    kind: OverrideKind,
    flags: FlagBits,
    letters: String,
}

#[derive(Serialize)]
struct CacheDump {
    overrides: Vec<OverrideOutput>,
    groups: Vec<GroupSummary>,
    admins: Vec<AdminSummary>,
}

pub fn run_dump(args: CacheArgs) -> anyhow::Result<()> {
    let cache = init_cache(&args)?;
    let letters = cache.flag_letters();

    let overrides: Vec<OverrideOutput> = [OverrideKind::Command, OverrideKind::CommandGroup]
        .into_iter()
        .flat_map(|kind| {
            cache
                .command_overrides(kind)
                .map(move |(target, flags)| (target, kind, flags))
        })
        .map(|(target, kind, flags)| OverrideOutput {
            target: target.to_string(),
            kind,
            flags,
            letters: letters.to_flag_string(flags),
        })
        .collect();
    let groups: Vec<GroupSummary> = cache
        .groups()
        .into_iter()
        .filter_map(|id| cache.group_summary(id))
        .collect();
    let admins: Vec<AdminSummary> = cache
        .admins()
        .into_iter()
        .filter_map(|id| cache.admin_summary(id))
        .collect();

    if args.json {
        let dump = CacheDump {
            overrides,
            groups,
            admins,
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    println!();
    println!("Admin Cache");
    println!("{}", "─".repeat(11));

    println!("Overrides:   {}", overrides.len());
    for entry in &overrides {
        let prefix = match entry.kind {
            OverrideKind::Command => "",
            OverrideKind::CommandGroup => "@",
        };
        println!("  {}{:<20} {}", prefix, entry.target, entry.letters);
    }

    println!("Groups:      {}", groups.len());
    for group in &groups {
        let mut line = format!(
            "  {:<20} {}",
            group.name,
            letters.to_flag_string(group.add_flags)
        );
        if !group.immune_from.is_empty() {
            line.push_str(&format!("  immune from: {}", group.immune_from.join(", ")));
        }
        println!("{line}");
    }

    println!("Admins:      {}", admins.len());
    for admin in &admins {
        let name = admin.name.as_deref().unwrap_or("<unnamed>");
        let mut line = format!(
            "  {:<20} {} (effective {})",
            name,
            letters.to_flag_string(admin.flags),
            letters.to_flag_string(admin.effective_flags)
        );
        if let Some(identity) = &admin.identity {
            line.push_str(&format!("  {}:{}", identity.method, identity.identity));
        }
        if !admin.groups.is_empty() {
            line.push_str(&format!("  groups: {}", admin.groups.join(", ")));
        }
        println!("{line}");
    }
    println!();

    Ok(())
}
