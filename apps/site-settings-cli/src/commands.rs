use std::sync::Arc;

use anyhow::{Context, Result};
use site_settings::{
    ConfigurationSummary, FlagControl, SettingsFlag, SiteSettings, SiteSettingsApi,
    SiteSettingsModule,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::config::AppConfig;

/// Parses `flag=value` as given to `set`.
pub fn parse_assignment(raw: &str) -> Result<(SettingsFlag, bool), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FLAG=VALUE, got '{raw}'"))?;
    let flag = name.trim().parse::<SettingsFlag>().map_err(|e| e.to_string())?;
    let value = match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => true,
        "false" | "off" | "no" | "0" => false,
        other => return Err(format!("invalid value '{other}' for {flag}")),
    };
    Ok((flag, value))
}

/// Builds the module from `config` and loads the current record.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn SiteSettingsApi>> {
    let module = SiteSettingsModule::default();
    module.init(&config.settings)?;
    let client = module.client()?;
    client
        .load()
        .await
        .context("failed to load site settings")?;
    Ok(client)
}

pub async fn show(config: &AppConfig) -> Result<()> {
    let client = connect(config).await?;
    println!("{}", render_summary(&client.summary()?));
    println!();
    println!("{}", render_controls(&client.controls()?));
    Ok(())
}

pub async fn toggle(config: &AppConfig, flag: SettingsFlag) -> Result<()> {
    let client = connect(config).await?;
    let saved = client
        .toggle_flag(flag)
        .await
        .with_context(|| format!("failed to toggle {flag}"))?;
    info!(%flag, value = saved.get(flag), "flag toggled");
    println!("{}", render_change(flag, &saved));
    Ok(())
}

pub async fn set(config: &AppConfig, assignments: &[(SettingsFlag, bool)]) -> Result<()> {
    let client = connect(config).await?;
    for (flag, value) in assignments {
        client.stage_flag(*flag, *value)?;
    }

    let unsaved = client.snapshot().unsaved_flags();
    if unsaved.is_empty() {
        println!("No changes to save");
        return Ok(());
    }

    let saved = client
        .save_all()
        .await
        .context("failed to save site settings")?;
    info!(changed = unsaved.len(), "settings saved");
    for flag in unsaved {
        println!("{}", render_change(flag, &saved));
    }
    Ok(())
}

/// Validates the configuration by building the store without contacting it.
pub fn check(config: &AppConfig) -> Result<()> {
    SiteSettingsModule::default().init(&config.settings)?;
    println!("Configuration is valid");
    println!("{}", config.to_json()?);
    Ok(())
}

fn render_change(flag: SettingsFlag, saved: &SiteSettings) -> String {
    let mut line = format!("{flag} = {}", on_off(saved.get(flag)));
    if saved.get(flag) && !saved.effective(flag) {
        line.push_str(" (inactive in portfolio mode)");
    }
    line
}

fn render_summary(summary: &ConfigurationSummary) -> String {
    [
        format!("Mode:                    {}", summary.mode),
        format!("Payments:                {}", on_off(summary.payments)),
        format!(
            "Automatic delivery:      {}",
            on_off(summary.automatic_delivery)
        ),
        format!("Show prices:             {}", on_off(summary.show_prices)),
        format!(
            "Order auto-confirmation: {}",
            on_off(summary.order_auto_confirmation)
        ),
        format!(
            "Email notifications:     {}",
            on_off(summary.email_notifications)
        ),
        format!(
            "Last updated:            {}",
            format_timestamp(summary.last_updated)
        ),
    ]
    .join("\n")
}

fn render_controls(controls: &[FlagControl]) -> String {
    controls
        .iter()
        .map(|c| {
            let lock = if c.locked { "  [locked]" } else { "" };
            format!(
                "{:<28} {:<4} {}{}",
                c.flag.wire_name(),
                on_off(c.stored),
                c.description,
                lock
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
