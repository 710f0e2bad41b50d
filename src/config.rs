use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::debounce::DEFAULT_SEARCH_DEBOUNCE_MS;
use crate::gateway::DEFAULT_BASE_URL;
use crate::types::PokemonType;

/// Pokedex - browse the PokeAPI catalog from the terminal
///
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "PokeAPI catalog browser", long_about = None)]
pub struct CliArgs {
    /// PokeAPI base URL
    #[arg(long, env = "POKEAPI_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to the SQLite database holding favorites and theme
    #[arg(long, env = "POKEDEX_DB_PATH")]
    pub db_path: Option<String>,

    /// Quiet period before a typed search is sent, in milliseconds (50-5000)
    #[arg(long, env = "SEARCH_DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show one catalog page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Only show records of this type
        #[arg(short = 't', long = "type", value_parser = clap::value_parser!(PokemonType))]
        kind: Option<PokemonType>,
    },
    /// Search names (first 10 matches)
    Search { query: String },
    /// Show one record with species info and evolution chain
    Show { key: String },
    /// Toggle a favorite by id
    Favorite { id: u32 },
    /// List favorites
    Favorites,
    /// Toggle dark mode
    Theme,
    /// Line-driven browsing session
    Browse,
}

impl Default for Command {
    fn default() -> Self {
        Command::List { page: 1, kind: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub db_path: String,
    pub debounce_ms: u64,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Basic scheme check
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl Config {
    pub fn from_args(args: &CliArgs) -> Result<Config> {
        let base_url = args
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_url(&base_url, "POKEAPI_BASE_URL")?;

        let db_path = args
            .db_path
            .clone()
            .unwrap_or_else(|| "./pokedex.db".to_string());
        if db_path.trim().is_empty() {
            return Err(anyhow!("POKEDEX_DB_PATH cannot be empty"));
        }

        let debounce_ms = args.debounce_ms.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS);
        let debounce_ms = validate_in_range(debounce_ms, 50, 5000, "SEARCH_DEBOUNCE_MS")?;

        Ok(Config {
            base_url,
            db_path,
            debounce_ms,
        })
    }

    pub fn print_summary(&self) {
        eprintln!("Pokedex Configuration:");
        eprintln!("  API: {}", self.base_url);
        eprintln!("  Database: {}", self.db_path);
        eprintln!("  Search debounce: {}ms", self.debounce_ms);
    }
}

/// Parse CLI args (with env fallbacks) into a validated config and command.
pub fn load() -> Result<(Config, Command)> {
    let args = CliArgs::parse();
    let config = Config::from_args(&args)?;
    Ok((config, args.command.unwrap_or_default()))
}
