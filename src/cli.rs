// Argument parsing, the per-run context and the top-level dispatch. The
// context is built once per invocation and handed to the command handlers
// in `commands`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiClient, DEFAULT_BASE_URL};
use crate::commands;
use crate::config::ConfigStore;
use crate::error::{CliError, CliResult};
use crate::logger::Logger;

/// Printed after every error.
pub const HELP_HINT: &str = "You can execute (shortify --help) for additional information";

/// Default lifetime of links created without `--expiry`.
pub const DEFAULT_SHORTEN_EXPIRY: &str = "12h";

/// Default lifetime applied by `update` without `--expiry`.
pub const DEFAULT_UPDATE_EXPIRY: &str = "never";

const ENV_CONFIG_FILE: &str = "SHORTIFY_CONFIG";
const ENV_API_KEY: &str = "SHORTENER_API_KEY";

#[derive(Parser, Debug)]
#[command(
    name = "shortify",
    about = "Shorten your favorite URL using the CLI.",
    version,
    override_usage = "shortify <url> [options]\n       shortify <COMMAND> [options]"
)]
pub struct Cli {
    /// URL to shorten
    pub url: Option<String>,
    /// Set an expiry for the link (e.g. 12h, 7d, 3m, 1y or never)
    #[arg(short, long, default_value = DEFAULT_SHORTEN_EXPIRY)]
    pub expiry: String,
    /// Base URL of the shortening service
    #[arg(
        long,
        global = true,
        env = "SHORTIFY_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_BASE_URL
    )]
    pub api_url: Url,
    /// Path of the configuration file
    #[arg(long, global = true, env = ENV_CONFIG_FILE)]
    pub config_file: Option<PathBuf>,
    /// Print diagnostic logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get all the information about a short link
    Get(SidArgs),
    /// Delete a short link
    Delete(SidArgs),
    /// Update the expiry of a short link
    Update(UpdateArgs),
    /// Manage and view logger settings
    Logger(LoggerArgs),
    /// View and modify application configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default)]
pub struct SidArgs {
    /// The short ID of the URL
    #[arg(short, long)]
    pub sid: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// The short ID of the URL
    #[arg(short, long)]
    pub sid: Option<String>,
    /// New expiry for the link
    #[arg(short, long, default_value = DEFAULT_UPDATE_EXPIRY)]
    pub expiry: String,
}

#[derive(Args, Debug, Default)]
pub struct LoggerArgs {
    /// Display the current logger configuration
    #[arg(short, long)]
    pub config: bool,
    /// Reset logger settings to default
    #[arg(short, long)]
    pub reset: bool,
    /// Print a sample line in every available color
    #[arg(long)]
    pub colors: bool,
    /// Set the color for info level logs
    #[arg(long, value_name = "COLOR")]
    pub info: Option<String>,
    /// Set the color for warning level logs
    #[arg(long, value_name = "COLOR")]
    pub warn: Option<String>,
    /// Set the color for error level logs
    #[arg(long, value_name = "COLOR")]
    pub error: Option<String>,
}

impl LoggerArgs {
    pub fn has_flags(&self) -> bool {
        self.config
            || self.reset
            || self.colors
            || self.info.is_some()
            || self.warn.is_some()
            || self.error.is_some()
    }
}

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Display the current application configuration (also the default
    /// when no other flag is given)
    #[arg(short, long)]
    pub config: bool,
    /// Reset application configuration to default
    #[arg(short, long)]
    pub reset: bool,
    /// Set the API key; prompts for it when no value is given
    #[arg(long, value_name = "KEY", num_args = 0..=1)]
    pub api_key: Option<Option<String>>,
}

/// Everything a command handler needs for one invocation.
pub struct Context {
    pub store: ConfigStore,
    pub logger: Logger,
    api_url: Url,
    api_key_override: Option<String>,
}

impl Context {
    /// Build the context for a run: the logger takes its colors from the
    /// stored configuration, or the defaults when it cannot be read.
    pub fn new(store: ConfigStore, api_url: Url, api_key_override: Option<String>) -> Self {
        let colors = store.load().map(|config| config.logger).unwrap_or_default();
        Self::with_logger(store, Logger::new(colors), api_url, api_key_override)
    }

    pub fn with_logger(
        store: ConfigStore,
        logger: Logger,
        api_url: Url,
        api_key_override: Option<String>,
    ) -> Self {
        Self {
            store,
            logger,
            api_url,
            api_key_override: api_key_override.filter(|key| !key.trim().is_empty()),
        }
    }

    /// API client carrying the key configured right now. The environment
    /// key wins over the stored one.
    pub fn api(&self) -> CliResult<ApiClient> {
        let api_key = match &self.api_key_override {
            Some(key) => Some(key.clone()),
            None => self
                .store
                .read(&self.logger)
                .api_key()
                .map(str::to_string),
        };
        ApiClient::new(self.api_url.clone(), api_key).map_err(CliError::failure)
    }

    pub fn report(&self, err: &CliError) {
        report_error(&self.logger, err);
    }
}

/// Print an error with the `[ERROR]:` tag followed by the help hint.
pub fn report_error(logger: &Logger, err: &CliError) {
    logger.error(format!("[ERROR]: {err}")).error(HELP_HINT);
}

/// Parse `args`, run the requested command and return the exit code.
pub fn run<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => return report_parse_error(&err),
    };
    init_tracing(cli.verbose);

    let path = cli
        .config_file
        .clone()
        .unwrap_or_else(ConfigStore::default_path);
    let store = ConfigStore::new(path);
    let ctx = Context::new(store, cli.api_url.clone(), std::env::var(ENV_API_KEY).ok());
    tracing::debug!(config = %ctx.store.path().display(), api = %cli.api_url, "starting");

    match dispatch(&ctx, cli) {
        Ok(()) => 0,
        Err(err) => {
            ctx.report(&err);
            err.exit_code()
        }
    }
}

fn dispatch(ctx: &Context, cli: Cli) -> CliResult<()> {
    match cli.command {
        Some(Command::Get(args)) => commands::handle_get(ctx, args),
        Some(Command::Delete(args)) => commands::handle_delete(ctx, args),
        Some(Command::Update(args)) => commands::handle_update(ctx, args),
        Some(Command::Logger(args)) => commands::handle_logger(ctx, args),
        Some(Command::Config(args)) => commands::handle_config(ctx, args),
        None => match cli.url {
            Some(url) => commands::handle_shorten(ctx, &url, &cli.expiry),
            None => Err(CliError::validation("missing required argument '<url>'")),
        },
    }
}

// Help and version go to stdout as clap renders them; real parse errors
// get the same `[ERROR]:` treatment as command errors.
fn report_parse_error(err: &clap::Error) -> u8 {
    if matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    ) {
        if let Err(print_err) = err.print() {
            tracing::debug!(error = %print_err, "failed to print help");
        }
        return 0;
    }

    let rendered = err.to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();
    let path = std::env::var_os(ENV_CONFIG_FILE)
        .map(PathBuf::from)
        .unwrap_or_else(ConfigStore::default_path);
    let colors = ConfigStore::new(path)
        .load()
        .map(|config| config.logger)
        .unwrap_or_default();
    let err = CliError::validation(message);
    report_error(&Logger::new(colors), &err);
    err.exit_code()
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shortify=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when running inside tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse the API URL provided to the CLI.
fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
