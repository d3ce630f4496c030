use clap::ValueEnum;
use serde::Serialize;
use tabled::Tabled;
use thanks::stars::{ReconciledRepo, StarCount};

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// One reconciled repository for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct RepoRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Repository")]
    pub repo: String,
    #[tabled(rename = "Starred", display_with = "yes_no")]
    pub starred: bool,
    #[tabled(rename = "Stars", display_with = "star_count")]
    pub stars: Option<u64>,
}

fn yes_no(starred: &bool) -> String {
    let text = if *starred { "yes" } else { "no" };
    text.to_string()
}

fn star_count(stars: &Option<u64>) -> String {
    stars.map_or_else(|| StarCount::Unknown.to_string(), |n| n.to_string())
}

impl From<&ReconciledRepo> for RepoRow {
    fn from(entry: &ReconciledRepo) -> Self {
        Self {
            name: entry.candidate.name().to_string(),
            kind: entry.candidate.kind().to_string(),
            repo: entry.candidate.repo().to_string(),
            starred: entry.is_starred,
            stars: entry.star_count.known(),
        }
    }
}

impl RepoRow {
    /// Render rows in catalog order.
    pub(crate) fn render(rows: &[Self], format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Table => {
                let mut table = tabled::Table::new(rows.to_vec());
                table.with(tabled::settings::Style::rounded());
                Ok(table.to_string())
            }
            OutputFormat::Json => serde_json::to_string_pretty(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<RepoRow> {
        vec![
            RepoRow {
                name: "Dataview".to_string(),
                kind: "plugin".to_string(),
                repo: "blacksmithgu/obsidian-dataview".to_string(),
                starred: true,
                stars: Some(7000),
            },
            RepoRow {
                name: "Minimal".to_string(),
                kind: "theme".to_string(),
                repo: "kepano/obsidian-minimal".to_string(),
                starred: false,
                stars: None,
            },
        ]
    }

    #[test]
    fn table_output_shows_unknown_counts() {
        let table = RepoRow::render(&rows(), OutputFormat::Table).unwrap();
        assert!(table.contains("Repository"));
        assert!(table.contains("blacksmithgu/obsidian-dataview"));
        assert!(table.contains("7000"));
        assert!(table.contains('?'));
    }

    #[test]
    fn json_output_keeps_order_and_nulls() {
        let json = RepoRow::render(&rows(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["repo"], "blacksmithgu/obsidian-dataview");
        assert_eq!(value[0]["stars"], 7000);
        assert_eq!(value[1]["starred"], false);
        assert!(value[1]["stars"].is_null());
    }
}
