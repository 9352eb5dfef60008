use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use subgrab::{RunSummary, SubtitleSource};
#[cfg(feature = "table-output")]
use tabled::{Table, Tabled, settings::Style};

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_summary(&self, summary: &RunSummary, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(summary)),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(summary)?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    fn format_pretty(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        output.push_str(&self.colorize("Run Summary:", &Color::Green, true));
        output.push('\n');

        let mut field = |name: &str, value: String| {
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize(name, &Color::Yellow, false),
                self.colorize(&value, &Color::Cyan, false)
            ));
        };
        field(
            "Channel",
            summary.channel.clone().unwrap_or_else(|| "Unknown".into()),
        );
        field("Mode", format!("{:?}", summary.mode).to_lowercase());
        field("Enumerated", summary.enumerated.to_string());
        field("Skipped (already processed)", summary.skipped.to_string());
        field("Processed", summary.processed.to_string());
        if summary.reprocessed > 0 {
            field("Reprocessed", summary.reprocessed.to_string());
        }
        for source in [
            SubtitleSource::Manual,
            SubtitleSource::AutoCaption,
            SubtitleSource::Whisper,
            SubtitleSource::None,
        ] {
            field(&format!("  {source}"), summary.count(source).to_string());
        }

        if !summary.results.is_empty() {
            output.push('\n');
            output.push_str(&self.format_results(summary));
        }
        output
    }

    #[cfg(feature = "table-output")]
    fn format_results(&self, summary: &RunSummary) -> String {
        #[derive(Tabled)]
        struct ResultRow<'a> {
            #[tabled(rename = "Video")]
            video_id: &'a str,
            #[tabled(rename = "Title")]
            title: &'a str,
            #[tabled(rename = "Source")]
            source: &'a str,
            #[tabled(rename = "Language")]
            language: &'a str,
            #[tabled(rename = "File")]
            path: &'a str,
        }

        let rows = summary.results.iter().map(|r| ResultRow {
            video_id: &r.video_id,
            title: &r.title,
            source: r.subtitle_source.as_str(),
            language: &r.languages,
            path: r.subtitle_path.as_deref().unwrap_or(""),
        });
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        format!("{table}\n")
    }

    #[cfg(not(feature = "table-output"))]
    fn format_results(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        for r in &summary.results {
            output.push_str(&format!(
                "  {} {} [{}] {}\n",
                self.colorize(&r.video_id, &Color::Blue, false),
                r.title,
                r.subtitle_source,
                r.languages
            ));
        }
        output
    }

    #[allow(unused_variables)]
    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            text.to_string()
        }
    }
}

#[allow(dead_code)]
enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}

#[cfg(test)]
mod tests {
    use super::*;
    use subgrab::FilterMode;
    use subgrab::pipeline::VideoReport;

    fn summary() -> RunSummary {
        RunSummary {
            channel: Some("DanKoeTalks".into()),
            mode: FilterMode::Incremental,
            enumerated: 3,
            skipped: 1,
            processed: 2,
            reprocessed: 0,
            results: vec![
                VideoReport {
                    video_id: "abc".into(),
                    title: "First".into(),
                    url: "https://www.youtube.com/watch?v=abc".into(),
                    subtitle_source: SubtitleSource::Manual,
                    languages: "en".into(),
                    subtitle_path: Some("final/first.txt".into()),
                },
                VideoReport {
                    video_id: "def".into(),
                    title: "Second".into(),
                    url: "https://www.youtube.com/watch?v=def".into(),
                    subtitle_source: SubtitleSource::None,
                    languages: String::new(),
                    subtitle_path: None,
                },
            ],
        }
    }

    #[test]
    fn test_pretty_summary() {
        let text = OutputManager::new(false)
            .format_summary(&summary(), OutputFormat::Pretty)
            .unwrap();
        assert!(text.contains("Channel: DanKoeTalks"));
        assert!(text.contains("Processed: 2"));
        assert!(text.contains("manual: 1"));
        assert!(text.contains("final/first.txt"));
    }

    #[test]
    fn test_json_summary() {
        let text = OutputManager::new(false)
            .format_summary(&summary(), OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["mode"], "incremental");
        assert_eq!(value["results"][0]["subtitle_source"], "manual");
        assert_eq!(value["results"][1]["subtitle_path"], serde_json::Value::Null);
    }
}
