// Command handlers. Each one validates its input first and only then
// touches the network or the configuration file, so a rejected command
// has no side effects.

use std::time::Duration;

use anyhow::{anyhow, Context as _};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::api::{ApiReply, ShortenRequest, UpdateRequest};
use crate::cli::{ConfigArgs, Context, LoggerArgs, SidArgs, UpdateArgs};
use crate::config::{Config, LoggerColors, PartialConfig};
use crate::error::{CliError, CliResult};
use crate::logger::{Level, Palette, RESET};
use crate::validate::{is_alphabet_numeric, is_expiry, is_valid_url};

const INVALID_URL: &str = "Invalid URL, verify the structure of the link";
const INVALID_EXPIRY: &str = "Invalid expiry date, verify the structure of the date";
const INVALID_SID: &str = "Invalid short ID, verify the structure of the link";

/// `shortify <url> [-e <expiry>]`
pub fn handle_shorten(ctx: &Context, url: &str, expiry: &str) -> CliResult<()> {
    if !is_valid_url(url) {
        return Err(CliError::validation(INVALID_URL));
    }
    if !is_expiry(expiry) {
        return Err(CliError::validation(INVALID_EXPIRY));
    }

    let api = ctx.api()?;
    let req = ShortenRequest {
        url: url.to_string(),
        expiry: Some(expiry.to_string()),
    };
    let reply = with_spinner("Shortening...", || api.shorten_url(&req));
    print_reply(ctx, reply)
}

/// `shortify get -s <sid>`
pub fn handle_get(ctx: &Context, args: SidArgs) -> CliResult<()> {
    let sid = require_sid(args.sid.as_deref())?;
    let api = ctx.api()?;
    let reply = with_spinner("Fetching link...", || api.get_short_url(sid));
    print_reply(ctx, reply)
}

/// `shortify delete -s <sid>`
pub fn handle_delete(ctx: &Context, args: SidArgs) -> CliResult<()> {
    let sid = require_sid(args.sid.as_deref())?;
    let api = ctx.api()?;
    let reply = with_spinner("Deleting link...", || api.delete_url(sid));
    print_reply(ctx, reply)
}

/// `shortify update -s <sid> [-e <expiry>]`
pub fn handle_update(ctx: &Context, args: UpdateArgs) -> CliResult<()> {
    let sid = require_sid(args.sid.as_deref())?;
    if !is_expiry(&args.expiry) {
        return Err(CliError::validation(INVALID_EXPIRY));
    }

    let api = ctx.api()?;
    let req = UpdateRequest {
        sid: sid.to_string(),
        expiry: Some(args.expiry),
    };
    let reply = with_spinner("Updating link...", || api.update_url(&req));
    print_reply(ctx, reply)
}

/// `shortify config [-c] [-r] [--api-key [<key>]]`
pub fn handle_config(ctx: &Context, args: ConfigArgs) -> CliResult<()> {
    if args.reset {
        ctx.store
            .create(true, &ctx.logger)
            .context("Error resetting config file")
            .map_err(CliError::failure)?;
        ctx.logger.info("Configuration has been reset to default values.");
        return Ok(());
    }

    if let Some(key) = args.api_key {
        let key = match key {
            Some(key) => key,
            None => prompt_api_key()?,
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::validation("The API key cannot be empty"));
        }
        save(ctx, &PartialConfig::api_key(key))?;
        ctx.logger.info("API key has been updated successfully.");
        return Ok(());
    }

    // `--config` and a bare `shortify config` both print the configuration.
    let config = ctx.store.read(&ctx.logger);
    ctx.logger
        .line(Level::Info, &[&"Configuration:", &to_pretty_json(&config)?]);
    Ok(())
}

/// `shortify logger [-c] [-r] [--colors] [--info <c>] [--warn <c>] [--error <c>]`
pub fn handle_logger(ctx: &Context, args: LoggerArgs) -> CliResult<()> {
    if !args.has_flags() {
        return Err(CliError::validation("The logger command requires at least one flag"));
    }

    if args.config {
        let colors = ctx.store.read(&ctx.logger).logger;
        ctx.logger
            .info("Logger configuration loaded:")
            .info(to_pretty_json(&colors)?);
        return Ok(());
    }

    if args.reset {
        ctx.logger.info("Resetting logger configuration to default");
        save(ctx, &PartialConfig::logger(LoggerColors::default()))?;
        return Ok(());
    }

    if args.colors {
        for color in Palette::ALL {
            ctx.logger.info(format!(
                "{}: {}This is a test message{}",
                color.name(),
                color.ansi_code(),
                RESET
            ));
        }
        return Ok(());
    }

    let updates: Vec<(Level, &str)> = [
        (Level::Info, args.info.as_deref()),
        (Level::Warn, args.warn.as_deref()),
        (Level::Error, args.error.as_deref()),
    ]
    .into_iter()
    .filter_map(|(level, name)| name.map(|name| (level, name)))
    .collect();

    // Reject the whole invocation before writing anything if one name is bad.
    for (level, name) in &updates {
        parse_color(*level, name)?;
    }
    for (level, name) in updates {
        update_logger_color(ctx, level, name)?;
    }
    Ok(())
}

/// Persist `color_name` as the color of `level`. Unknown names are
/// rejected and leave the configuration untouched; other levels keep
/// their stored colors.
pub fn update_logger_color(ctx: &Context, level: Level, color_name: &str) -> CliResult<()> {
    let color = parse_color(level, color_name)?;
    save(ctx, &PartialConfig::logger_color(level, color.ansi_code()))?;
    ctx.logger.info(format!("{} logger color updated", level.title()));
    Ok(())
}

fn parse_color(level: Level, name: &str) -> CliResult<Palette> {
    name.parse::<Palette>()
        .map_err(|_| CliError::validation(format!("Invalid color for {} logger", level.title())))
}

fn save(ctx: &Context, partial: &PartialConfig) -> CliResult<Config> {
    ctx.store
        .try_write(partial, &ctx.logger)
        .context("Error writing config file")
        .map_err(CliError::failure)
}

fn require_sid(sid: Option<&str>) -> CliResult<&str> {
    match sid {
        Some(sid) if is_alphabet_numeric(sid) => Ok(sid),
        _ => Err(CliError::validation(INVALID_SID)),
    }
}

fn print_reply<T: Serialize>(ctx: &Context, reply: ApiReply<T>) -> CliResult<()> {
    match reply {
        ApiReply::Data(data) => {
            ctx.logger.info(to_pretty_json(&data)?);
            Ok(())
        }
        ApiReply::Error(payload) => Err(CliError::Remote(payload.message)),
        ApiReply::MissingCredential => Err(CliError::MissingCredential),
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

/// Ask for the API key without echoing it to the terminal.
fn prompt_api_key() -> CliResult<String> {
    Password::new()
        .with_prompt("API key")
        .interact()
        .context("Failed to read the API key")
        .map_err(CliError::failure)
}

/// Run `op` while a spinner is shown on stderr. The spinner is hidden when
/// stderr is not a terminal.
fn with_spinner<T>(message: &'static str, op: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = op();
    spinner.finish_and_clear();
    result
}
