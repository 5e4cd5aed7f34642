use super::{history_path, load_config, load_credentials};
use crate::output::{Output, OutputFormat};
use chrono::{NaiveDate, Utc};
use color_eyre::Result;
use moviepicks_config::PathManager;
use moviepicks_core::{PicksOrchestrator, PicksResult};
use owo_colors::OwoColorize;

pub async fn run_picks(dry_run: bool, date: Option<NaiveDate>, output: &Output) -> Result<()> {
    tracing::debug!(dry_run, ?date, "Run command started");

    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;
    let credentials = load_credentials(&path_manager)?;
    let history_file = history_path(&config, &path_manager);

    let orchestrator = PicksOrchestrator::from_config(&config, &credentials, history_file, dry_run)
        .map_err(|e| color_eyre::eyre::eyre!("Configuration check failed: {}", e))?;

    let result = match date {
        Some(date) => orchestrator.run_for_date(date).await,
        None => orchestrator.run(Utc::now()).await,
    };

    report(&result, output)
}

fn report(result: &PicksResult, output: &Output) -> Result<()> {
    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            output.info(format!(
                "{} {} ({}), {} candidates found",
                "Theme:".bright_cyan().bold(),
                result.theme_label,
                result.date.format("%A %Y-%m-%d"),
                result.candidates_found
            ));

            if result.dry_run {
                output.println("");
                output.println(&result.message);
                output.println("");
            }

            if result.nothing_found() {
                output.warn("No eligible movies today; the nothing-found message was produced instead");
            } else {
                for item in &result.items {
                    output.println(format!(
                        "  {} {} ({:.1}, {})",
                        "•".bright_black(),
                        item.title.bold(),
                        item.average_rating,
                        item.certification
                    ));
                }
            }

            if result.dry_run {
                output.success("Dry run complete: nothing sent, history unchanged");
                return Ok(());
            }

            if result.delivered {
                output.success(format!("Message delivered in {}ms", result.duration_ms));
            } else {
                output.warn("Message delivery failed; see the log for details");
            }
            if !result.nothing_found() && !result.history_persisted {
                output.warn("History could not be saved; these movies may be picked again");
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value = serde_json::to_value(result)?;
            output.json(&value);
        }
    }

    Ok(())
}
