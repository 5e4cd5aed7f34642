use super::{history_path, load_config, load_credentials};
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use moviepicks_config::{Config, CredentialStore, PathManager, SelectionPolicyKind};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(output),
        ConfigCommands::Init { force } => init_config(force, output),
        ConfigCommands::SetCredential { name, value } => set_credential(&name, &value, output),
        ConfigCommands::UnsetCredential { name } => unset_credential(&name, output),
    }
}

fn styled_table(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn show_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = load_config(&path_manager)?;
    let credentials = load_credentials(&path_manager)?;
    let history_file = history_path(&config, &path_manager);

    let validation = config.validate().err().map(|e| e.to_string());
    let missing = credentials.missing(true);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
            println!("{} {}", "║".bright_white(), "MoviePicks Configuration".bright_cyan().bold());
            println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
            println!();

            let mut files = styled_table("Files");
            files.add_row(vec![
                Cell::new("Config"),
                Cell::new(if config_file.exists() {
                    config_file.display().to_string()
                } else {
                    format!("{} (not found, using defaults)", config_file.display())
                }),
            ]);
            files.add_row(vec![Cell::new("Credentials"), Cell::new(path_manager.credentials_file().display())]);
            files.add_row(vec![Cell::new("History"), Cell::new(history_file.display())]);
            files.add_row(vec![Cell::new("Daemon log"), Cell::new(path_manager.daemon_log_file().display())]);
            println!("{}", files);
            println!();

            let selection = &config.selection;
            let mut picks = styled_table("Selection");
            picks.add_row(vec![Cell::new("Picks per day"), Cell::new(selection.count)]);
            picks.add_row(vec![Cell::new("No-repeat window"), Cell::new(format!("{} days", selection.no_repeat_days))]);
            picks.add_row(vec![Cell::new("Minimum rating"), Cell::new(format!("{:.1}", selection.min_rating))]);
            picks.add_row(vec![Cell::new("Minimum votes"), Cell::new(selection.min_vote_count)]);
            picks.add_row(vec![Cell::new("Released on or after"), Cell::new(selection.min_release_date)]);
            let policy = match selection.policy {
                SelectionPolicyKind::TopN => "top-n".to_string(),
                SelectionPolicyKind::Banded => {
                    let bands: Vec<String> = selection.bands.iter().map(|b| format!("{}-{}", b.floor, b.ceiling)).collect();
                    format!("banded [{}]", bands.join(", "))
                }
            };
            picks.add_row(vec![Cell::new("Policy"), Cell::new(policy)]);
            picks.add_row(vec![
                Cell::new("Eligibility gate"),
                Cell::new(if selection.eligibility.enabled { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            println!("{}", picks);
            println!();

            let mut enrichment = styled_table("Enrichment & schedule");
            enrichment.add_row(vec![
                Cell::new("Certification regions"),
                Cell::new(config.enrichment.certification_regions.join(", ")),
            ]);
            enrichment.add_row(vec![Cell::new("Provider regions"), Cell::new(config.enrichment.provider_regions.join(", "))]);
            enrichment.add_row(vec![
                Cell::new("Sensitivity summary"),
                Cell::new(if config.sensitivity.enabled { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            enrichment.add_row(vec![Cell::new("Cron (UTC)"), Cell::new(&config.schedule.cron)]);
            enrichment.add_row(vec![
                Cell::new("Reference zone"),
                Cell::new(format!("UTC{:+}m", config.schedule.utc_offset_minutes)),
            ]);
            println!("{}", enrichment);
            println!();

            let mut secrets = styled_table("Credentials");
            for (name, value) in credentials.masked() {
                secrets.add_row(vec![Cell::new(name), Cell::new(value)]);
            }
            println!("{}", secrets);
            println!();

            if let Some(problem) = &validation {
                output.warn(format!("Configuration is invalid: {}", problem));
            }
            if missing.is_empty() {
                output.success("All required settings are present");
            } else {
                output.warn(format!("Missing required settings: {}", missing.join(", ")));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let secrets: serde_json::Map<String, serde_json::Value> = credentials
                .masked()
                .into_iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect();
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "history_file": history_file.display().to_string(),
                "config": serde_json::to_value(&config)?,
                "credentials": secrets,
                "missing": missing,
                "validation_error": validation,
            }));
        }
    }

    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create application directories: {}", e))?;

    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    output.info(format!(
        "Set TMDB_API_KEY, ULTRA_INSTANCE_ID, ULTRA_TOKEN and WHATSAPP_TO in the environment or in {}",
        path_manager.credentials_file().display()
    ));
    Ok(())
}

fn open_store(path_manager: &PathManager) -> Result<CredentialStore> {
    let mut store = CredentialStore::new(path_manager.credentials_file());
    store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", store.path().display(), e))?;
    Ok(store)
}

fn set_credential(name: &str, value: &str, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let mut store = open_store(&path_manager)?;

    store.set(name, value).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", store.path().display(), e))?;

    let name = name.trim().to_uppercase();
    output.success(format!("Stored {} in {}", name, store.path().display()));
    if std::env::var_os(&name).is_some() {
        output.warn(format!("{} is also set in the environment, which takes precedence", name));
    }
    Ok(())
}

fn unset_credential(name: &str, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let mut store = open_store(&path_manager)?;

    let removed = store.remove(name).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let name = name.trim().to_uppercase();
    if !removed {
        output.info(format!("{} was not set in {}", name, store.path().display()));
        return Ok(());
    }

    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", store.path().display(), e))?;
    output.success(format!("Removed {} from {}", name, store.path().display()));
    Ok(())
}
