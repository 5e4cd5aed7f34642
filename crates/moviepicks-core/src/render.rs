//! Plain-text report for the messaging sink. WhatsApp renders `*x*` as bold.

use chrono::NaiveDate;
use moviepicks_models::{EnrichedItem, Sensitivity, StreamingAvailability};

const NOT_AVAILABLE: &str = "N/A";

fn header(lines: &mut Vec<String>, theme_label: &str, date: NaiveDate) {
    lines.push(format!("🎬 Daily Movie Picks – {}", date.format("%A, %d %B %Y")));
    lines.push(format!("Theme: {}", theme_label));
}

fn join_or_na(values: &[String]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(", ")
    }
}

pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) if m >= 60 => format!("{}h {}m", m / 60, m % 60),
        Some(m) if m > 0 => format!("{}m", m),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Report for one day's picks. Deterministic for identical input.
pub fn render_report(items: &[EnrichedItem], theme_label: &str, date: NaiveDate, min_rating: f64) -> String {
    let mut lines = Vec::new();
    header(&mut lines, theme_label, date);
    lines.push(format!(
        "You’ve got {} {} today (rating never below {:.1}):",
        items.len(),
        if items.len() == 1 { "movie" } else { "movies" },
        min_rating
    ));
    lines.push(String::new());

    for (idx, item) in items.iter().enumerate() {
        let year = item.year().map(|y| y.to_string()).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        lines.push(format!("{}) 🎥 *{}* ({})", idx + 1, item.title, year));
        lines.push(format!("   ⭐ Rating: {:.1}", item.average_rating));
        lines.push(format!("   🔞 Age rating: {}", item.certification));
        lines.push(format!("   ⏱ Runtime: {}", format_runtime(item.runtime_minutes)));
        lines.push(format!("   🎭 Genres: {}", join_or_na(&item.genre_names)));
        lines.push(format!("   🎬 Director: {}", item.director.as_deref().unwrap_or("Unknown")));
        lines.push(format!("   ⭐ Cast: {}", join_or_na(&item.top_cast)));
        lines.push(format!("   🌐 Languages: {}", join_or_na(&item.spoken_languages)));

        match &item.streaming {
            StreamingAvailability::Available(names) => lines.push(format!("   📺 Where to watch: {}", names.join(", "))),
            StreamingAvailability::UnavailableInRegion => {
                lines.push("   📺 Where to watch: Not streaming in your region".to_string())
            }
        }
        if let Some(url) = &item.trailer_url {
            lines.push(format!("   ▶️ Trailer: {}", url));
        }
        if let Some(sensitivity) = &item.sensitivity {
            let detail = match sensitivity {
                Sensitivity::Summary(summary) => format!("~{} scene(s). {}", summary.approximate_count, summary.summary),
                Sensitivity::Unavailable => "info unavailable".to_string(),
            };
            lines.push(format!("   ⚠️ Sensitive content: {}", detail));
        }
        if !item.overview.is_empty() {
            lines.push(format!("   📝 Summary: {}", item.overview));
        }
        lines.push(String::new());
    }

    lines.push("Enjoy your movies! 🍿".to_string());
    lines.join("\n")
}

/// Sent instead of a report when nothing eligible was found
pub fn render_nothing_found(theme_label: &str, date: NaiveDate) -> String {
    let mut lines = Vec::new();
    header(&mut lines, theme_label, date);
    lines.push(String::new());
    lines.push("No new movies matched today's theme; everything eligible was sent recently.".to_string());
    lines.push("Check back tomorrow! 🍿".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviepicks_models::{CertificationBucket, SensitivitySummary};

    fn item() -> EnrichedItem {
        EnrichedItem {
            id: 603,
            title: "The Matrix".to_string(),
            release_date: Some("1999-03-30".to_string()),
            average_rating: 8.216,
            vote_count: 25000,
            genre_ids: vec![28, 878],
            runtime_minutes: Some(136),
            genre_names: vec!["Action".to_string(), "Science Fiction".to_string()],
            director: Some("Lana Wachowski".to_string()),
            top_cast: vec!["Keanu Reeves".to_string(), "Laurence Fishburne".to_string()],
            spoken_languages: vec!["English".to_string()],
            certification: CertificationBucket::Sixteen,
            streaming: StreamingAvailability::Available(vec!["Netflix".to_string(), "Max".to_string()]),
            trailer_url: Some("https://www.youtube.com/watch?v=vKQi3bBA1y8".to_string()),
            overview: "A hacker learns the truth.".to_string(),
            sensitivity: Some(Sensitivity::Summary(SensitivitySummary {
                approximate_count: 4,
                summary: "Gun violence.".to_string(),
            })),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_report_layout() {
        let report = render_report(&[item()], "Mix Theme", monday(), 5.0);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "🎬 Daily Movie Picks – Monday, 03 June 2024");
        assert_eq!(lines[1], "Theme: Mix Theme");
        assert_eq!(lines[2], "You’ve got 1 movie today (rating never below 5.0):");
        assert_eq!(lines[4], "1) 🎥 *The Matrix* (1999)");
        assert!(report.contains("   ⭐ Rating: 8.2\n"));
        assert!(report.contains("   🔞 Age rating: 16+\n"));
        assert!(report.contains("   ⏱ Runtime: 2h 16m\n"));
        assert!(report.contains("   🎭 Genres: Action, Science Fiction\n"));
        assert!(report.contains("   📺 Where to watch: Netflix, Max\n"));
        assert!(report.contains("   ▶️ Trailer: https://www.youtube.com/watch?v=vKQi3bBA1y8\n"));
        assert!(report.contains("   ⚠️ Sensitive content: ~4 scene(s). Gun violence.\n"));
        assert_eq!(lines.last(), Some(&"Enjoy your movies! 🍿"));
    }

    #[test]
    fn test_report_placeholders() {
        let mut sparse = item();
        sparse.release_date = None;
        sparse.runtime_minutes = None;
        sparse.director = None;
        sparse.top_cast.clear();
        sparse.genre_names.clear();
        sparse.streaming = StreamingAvailability::UnavailableInRegion;
        sparse.trailer_url = None;
        sparse.sensitivity = Some(Sensitivity::Unavailable);
        sparse.overview.clear();

        let report = render_report(&[sparse.clone(), sparse], "Horror / Thriller", monday(), 5.0);
        assert!(report.contains("You’ve got 2 movies today"));
        assert!(report.contains("2) 🎥 *The Matrix* (N/A)"));
        assert!(report.contains("   🎬 Director: Unknown\n"));
        assert!(report.contains("   ⭐ Cast: N/A\n"));
        assert!(report.contains("   ⏱ Runtime: N/A\n"));
        assert!(report.contains("Not streaming in your region"));
        assert!(report.contains("Sensitive content: info unavailable"));
        assert!(!report.contains("Trailer"));
        assert!(!report.contains("📝"));
    }

    #[test]
    fn test_sensitivity_line_absent_when_disabled() {
        let mut plain = item();
        plain.sensitivity = None;
        assert!(!render_report(&[plain], "Mix Theme", monday(), 5.0).contains("Sensitive"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let items = vec![item(), item()];
        assert_eq!(
            render_report(&items, "Mix Theme", monday(), 5.0),
            render_report(&items, "Mix Theme", monday(), 5.0)
        );
    }

    #[test]
    fn test_runtime_format() {
        assert_eq!(format_runtime(Some(45)), "45m");
        assert_eq!(format_runtime(Some(60)), "1h 0m");
        assert_eq!(format_runtime(Some(0)), "N/A");
        assert_eq!(format_runtime(None), "N/A");
    }

    #[test]
    fn test_nothing_found_message() {
        let message = render_nothing_found("Comedy / Feel Good", NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert!(message.starts_with("🎬 Daily Movie Picks – Sunday, 09 June 2024\nTheme: Comedy / Feel Good"));
        assert!(message.contains("No new movies"));
    }
}
