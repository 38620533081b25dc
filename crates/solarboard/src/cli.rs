//! Clap derive structures for the `solarboard` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// solarboard -- admin console for the solar marketplace
#[derive(Debug, Parser)]
#[command(
    name = "solarboard",
    version,
    about = "Administer the solar marketplace from the command line",
    long_about = "Moderate products, manage engineers, shops and ads, and read the\n\
        dashboard of a solar-marketplace backend.\n\n\
        Reads are served from a short-lived query cache; every write\n\
        refreshes the lists and records it touches.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "SOLARBOARD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API host root (overrides profile)
    #[arg(long, env = "SOLARBOARD_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SOLARBOARD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SOLARBOARD_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout, e.g. "30s" or "2m" (overrides profile)
    #[arg(long, env = "SOLARBOARD_TIMEOUT", value_parser = humantime::parse_duration, global = true)]
    pub timeout: Option<Duration>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Color if stdout is a terminal and NO_COLOR is unset
    Auto,
    Always,
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session for this profile
    Login(LoginArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in administrator
    Whoami,

    /// Dashboard counters, analytics and recent activity
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Manage engineers
    #[command(alias = "eng")]
    Engineers(EngineersArgs),

    /// Manage shops
    Shops(ShopsArgs),

    /// Review marketplace products
    #[command(alias = "prod")]
    Products(ProductsArgs),

    /// Manage advertisements
    Ads(AdsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Admin email (defaults to the profile's email)
    #[arg(long, short = 'e', env = "SOLARBOARD_EMAIL")]
    pub email: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DASHBOARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub command: Option<DashboardCommand>,
}

#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    /// Headline counters (default)
    Counts,
    /// Analytics payload
    Analytics,
    /// Recent activity feed
    Activities,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENGINEERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EngineersArgs {
    #[command(subcommand)]
    pub command: EngineersCommand,
}

#[derive(Debug, Subcommand)]
pub enum EngineersCommand {
    /// List engineers
    #[command(alias = "ls")]
    List,

    /// Add an engineer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[command(flatten)]
        details: EngineerDetails,
    },

    /// Update an engineer (only the given fields change)
    Update {
        /// Engineer id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[command(flatten)]
        details: EngineerDetails,
    },

    /// Delete an engineer
    #[command(alias = "rm")]
    Delete {
        /// Engineer id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct EngineerDetails {
    #[arg(long)]
    pub whatsapp: Option<String>,
    /// Years or free-text experience
    #[arg(long)]
    pub experience: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Comma-separated services, e.g. "Installation,Maintenance"
    #[arg(long, value_delimiter = ',')]
    pub services: Option<Vec<String>>,
    /// Profile image URL
    #[arg(long)]
    pub image: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SHOPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ShopsArgs {
    #[command(subcommand)]
    pub command: ShopsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShopsCommand {
    /// List shops
    #[command(alias = "ls")]
    List,

    /// Show one shop
    Get {
        /// Shop id
        id: String,
    },

    /// Add a shop
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        owner_name: String,
        #[arg(long)]
        email: String,
        #[command(flatten)]
        details: ShopDetails,
    },

    /// Update a shop (only the given fields change)
    Update {
        /// Shop id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        owner_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[command(flatten)]
        details: ShopDetails,
    },

    /// Delete a shop
    #[command(alias = "rm")]
    Delete {
        /// Shop id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ShopDetails {
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub whatsapp: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Comma-separated services
    #[arg(long, value_delimiter = ',')]
    pub services: Option<Vec<String>>,
    /// Verification status, e.g. "verified"
    #[arg(long)]
    pub status: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PRODUCTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products awaiting or past moderation
    #[command(alias = "ls")]
    List {
        /// Only show products in this state
        #[arg(long)]
        status: Option<ProductStatusFilter>,
    },

    /// Show one product
    Get {
        /// Product id
        id: String,
    },

    /// Approve a product listing
    Approve {
        /// Product id
        id: String,
    },

    /// Reject a product listing
    Reject {
        /// Product id
        id: String,
        /// Reason shown to the seller
        #[arg(long, short = 'r')]
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProductStatusFilter {
    Pending,
    Approved,
    Rejected,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ADS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AdsArgs {
    #[command(subcommand)]
    pub command: AdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdsCommand {
    /// List ads
    #[command(alias = "ls")]
    List,

    /// Create an ad, optionally uploading an image first
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Local image or video to upload
        #[arg(long)]
        image: Option<PathBuf>,
        #[command(flatten)]
        details: AdDetails,
    },

    /// Update an ad (only the given fields change)
    Update {
        /// Ad id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replace the image with this local file
        #[arg(long)]
        image: Option<PathBuf>,
        #[command(flatten)]
        details: AdDetails,
    },

    /// Delete an ad
    #[command(alias = "rm")]
    Delete {
        /// Ad id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct AdDetails {
    /// Click-through URL
    #[arg(long)]
    pub link: Option<String>,
    /// First day the ad runs (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,
    /// Last day the ad runs (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,
    /// e.g. "active" or "inactive"
    #[arg(long)]
    pub status: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the resolved configuration (secrets masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the admin password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Store the media upload key in the system keyring
    SetUploadKey {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn timeout_accepts_humantime() {
        let cli = Cli::try_parse_from(["solarboard", "--timeout", "90s", "whoami"]);
        assert!(matches!(
            cli.map(|c| c.global.timeout),
            Ok(Some(d)) if d == Duration::from_secs(90)
        ));
    }

    #[test]
    fn services_split_on_commas() {
        let Ok(cli) = Cli::try_parse_from([
            "solarboard", "engineers", "add", "--name", "Ahmed", "--email", "a@b.c",
            "--phone", "0100", "--services", "Installation,Maintenance",
        ]) else {
            panic!("engineers add should parse");
        };
        let Command::Engineers(EngineersArgs {
            command: EngineersCommand::Add { details, .. },
        }) = cli.command
        else {
            panic!("wrong subcommand");
        };
        assert_eq!(
            details.services,
            Some(vec!["Installation".to_owned(), "Maintenance".to_owned()])
        );
    }
}
