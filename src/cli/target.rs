use serde::Serialize;

use super::{CacheArgs, find_admin_by_name, init_cache};

#[derive(Serialize)]
struct TargetOutput {
    admin: String,
    target: String,
    allowed: bool,
}

pub fn run_target(args: CacheArgs, admin: String, target: String) -> anyhow::Result<()> {
    let cache = init_cache(&args)?;
    let admin_id = find_admin_by_name(&cache, &admin)?;
    let target_id = find_admin_by_name(&cache, &target)?;
    let allowed = cache.can_admin_target(admin_id, target_id);

    if args.json {
        let output = TargetOutput {
            admin,
            target,
            allowed,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if allowed {
        println!("{admin} can target {target}");
    } else {
        println!("{admin} cannot target {target}");
    }

    Ok(())
}
