use serde::Serialize;

use crate::types::{FlagBits, OverrideKind};

use super::{CacheArgs, find_admin_by_name, init_cache, parse_flags};

#[derive(Serialize)]
struct AccessOutput {
    admin: String,
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_group: Option<String>,
    required: Vec<&'static str>,
    allowed: bool,
}

pub fn run_access(
    args: CacheArgs,
    admin: String,
    command: String,
    command_group: Option<String>,
    flags: Option<String>,
) -> anyhow::Result<()> {
    let cache = init_cache(&args)?;
    let admin_id = find_admin_by_name(&cache, &admin)?;
    let default_bits = match flags.as_deref() {
        Some(letters) => parse_flags(&cache, letters)?,
        None => FlagBits::NONE,
    };

    let allowed =
        cache.check_command_access(admin_id, &command, command_group.as_deref(), default_bits);
    let required = cache
        .get_command_override(&command, OverrideKind::Command)
        .or_else(|| {
            command_group
                .as_deref()
                .and_then(|group| cache.get_command_override(group, OverrideKind::CommandGroup))
        })
        .unwrap_or(default_bits);

    if args.json {
        let output = AccessOutput {
            admin,
            command,
            command_group,
            required: required.to_strings(),
            allowed,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", if allowed { "allowed" } else { "denied" });
    }

    Ok(())
}
