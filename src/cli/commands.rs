use clap::Args;

/// Where the cache is loaded from.
#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    /// TOML file with overrides, groups and admins
    #[arg(long, default_value = "./admins.toml")]
    pub config: String,

    /// Flag letter file; the default letters are used when omitted
    #[arg(long)]
    pub levels: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Selects an admin by name or by an auth method and identity.
#[derive(Args, Debug, Clone)]
pub struct AdminSelector {
    /// Admin name
    #[arg(long, conflicts_with_all = ["auth", "identity"])]
    pub admin: Option<String>,

    /// Auth method used with --identity (steam, name, ip)
    #[arg(long, requires = "identity")]
    pub auth: Option<String>,

    /// Identity under --auth
    #[arg(long, requires = "auth")]
    pub identity: Option<String>,
}
