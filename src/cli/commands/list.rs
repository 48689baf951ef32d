//! List command implementation
//!
//! Prints what can be selected for export: tag names in use and
//! interesting-item sets with their hit counts.

use crate::adapters::database::open_source_case;
use crate::config::load_config;
use clap::Args;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let source = match open_source_case(&config.source.case_database) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to open source case: {e}");
                return Ok(5);
            }
        };

        let tags = source.tag_names_in_use()?;
        let sets = source.interesting_item_set_counts()?;
        tracing::debug!(tags = tags.len(), sets = sets.len(), "Listed selectable items");

        if self.json {
            let tag_names: Vec<&str> = tags.iter().map(|t| t.display_name.as_str()).collect();
            let listing = serde_json::json!({
                "tag_names": tag_names,
                "interesting_item_sets": sets,
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
            return Ok(0);
        }

        println!("Tag names in use:");
        if tags.is_empty() {
            println!("  (none)");
        }
        for tag in &tags {
            if tag.is_notable() {
                println!("  {} (notable)", tag.display_name);
            } else {
                println!("  {}", tag.display_name);
            }
        }
        println!();

        println!("Interesting-item sets:");
        if sets.is_empty() {
            println!("  (none)");
        }
        for (name, count) in &sets {
            println!("  {name}: {count}");
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_source_case_exits_five() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portable-case.toml");
        std::fs::write(
            &path,
            format!(
                "[source]\ncase_database = \"{}\"\n\n[output]\ndirectory = \"{}\"\n",
                dir.path().join("absent.db").display(),
                dir.path().display()
            ),
        )
        .unwrap();

        let code = ListArgs { json: false }
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 5);
    }
}
