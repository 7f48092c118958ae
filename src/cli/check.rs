use serde::Serialize;

use crate::types::AccessMode;

use super::{AdminSelector, CacheArgs, init_cache, parse_flags, select_admin};

#[derive(Serialize)]
struct CheckOutput {
    admin: Option<String>,
    required: Vec<&'static str>,
    effective: Vec<&'static str>,
    allowed: bool,
}

pub fn run_check(args: CacheArgs, selector: AdminSelector, flags: String) -> anyhow::Result<()> {
    let cache = init_cache(&args)?;
    let admin = select_admin(&cache, &selector)?;
    let required = parse_flags(&cache, &flags)?;
    let allowed = required
        .iter()
        .all(|flag| cache.get_admin_flag(admin, flag, AccessMode::Effective));

    let output = CheckOutput {
        admin: cache.get_admin_name(admin).map(str::to_string),
        required: required.to_strings(),
        effective: cache
            .get_admin_flags(admin, AccessMode::Effective)
            .to_strings(),
        allowed,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", if allowed { "allowed" } else { "denied" });
    }

    Ok(())
}
