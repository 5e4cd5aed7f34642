use super::{history_path, load_config};
use crate::output::{Output, OutputFormat};
use chrono::{NaiveDate, Utc};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use moviepicks_config::PathManager;
use moviepicks_core::HistoryStore;
use moviepicks_models::HistoryEntry;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn show_history(limit: usize, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;
    let history_file = history_path(&config, &path_manager);

    let store = HistoryStore::open(history_file.clone());
    let recent = store.newest_first(limit);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if recent.is_empty() {
                output.info(format!("No history yet at {}", history_file.display()));
                return Ok(());
            }

            let today = config.schedule.reference_today(Utc::now());
            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Sent on").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Days ago").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("TMDB id").add_attribute(comfy_table::Attribute::Bold),
            ]);
            for entry in &recent {
                let (sent_on, ago) = age_columns(entry, today);
                table.add_row(vec![Cell::new(sent_on), Cell::new(ago), Cell::new(entry.id)]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

            output.println(table.to_string());
            output.println(format!(
                "{} {} of {} entries from {}",
                "Showing".bright_black(),
                recent.len(),
                store.len(),
                history_file.display()
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "file": history_file.display().to_string(),
                "total": store.len(),
                "entries": recent,
            }));
        }
    }

    Ok(())
}

/// "Sent on" and "Days ago" cells; `today` is in the reference zone
fn age_columns(entry: &HistoryEntry, today: NaiveDate) -> (String, String) {
    if entry.sent_on == HistoryEntry::epoch() {
        return ("(undated)".to_string(), "-".to_string());
    }
    let days = today.signed_duration_since(entry.sent_on).num_days();
    (entry.sent_on.to_string(), days.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use moviepicks_config::ScheduleConfig;

    #[test]
    fn test_days_ago_counts_from_reference_today() {
        // 20:30 UTC on the 6th is already the 7th at UTC+5
        let now = Utc.with_ymd_and_hms(2024, 6, 6, 20, 30, 0).unwrap();
        let today = ScheduleConfig::default().reference_today(now);
        let entry = HistoryEntry::new(603, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());

        assert_eq!(age_columns(&entry, today), ("2024-06-07".to_string(), "0".to_string()));
    }

    #[test]
    fn test_undated_entries() {
        let entry = HistoryEntry::new(550, HistoryEntry::epoch());
        let today = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        assert_eq!(age_columns(&entry, today), ("(undated)".to_string(), "-".to_string()));
    }
}
