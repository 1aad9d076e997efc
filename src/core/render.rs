use crate::core::clock::to_display_time;
use crate::core::{FetchOutcome, Match, RenderedReport};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const ODDS_PLACEHOLDER: &str = "-";
pub const EMPTY_ROW: &str = "| No data |  |  |  |  |";

const TABLE_ALIGNMENT: &str = "|:-------------:|:-----:|:-------:|:-----:|:------------:|";
const FOOTER: &str = "Maintained by the auto-update bot.";

/// Markdown 文件產生器，時區與聯盟名稱在建立時固定
#[derive(Debug, Clone)]
pub struct Renderer {
    source_tz: Tz,
    display_tz: Tz,
    federation: String,
}

impl Renderer {
    pub fn new(source_tz: Tz, display_tz: Tz, federation: impl Into<String>) -> Self {
        Self {
            source_tz,
            display_tz,
            federation: federation.into(),
        }
    }

    pub fn render(
        &self,
        outcome: &FetchOutcome,
        generated_at: DateTime<Utc>,
    ) -> Result<RenderedReport> {
        let updated = generated_at
            .with_timezone(&self.display_tz)
            .format("%Y-%m-%d %H:%M:%S");

        let mut lines = vec![
            format!("# ⚽️ {} Match Predictions", self.federation),
            String::new(),
            format!(
                "**Prediction date:** {} ({})",
                outcome.target_date.format("%Y-%m-%d"),
                self.source_tz.name()
            ),
            String::new(),
            format!("⏳ Updated: {} ({})", updated, self.display_tz.name()),
            String::new(),
            format!(
                "| Kick-off ({}) | Home | Away | Prediction | Odds |",
                self.display_tz.name()
            ),
            TABLE_ALIGNMENT.to_string(),
        ];

        let matches = outcome.matches();
        if matches.is_empty() {
            if outcome.is_failed() {
                tracing::warn!("⚠️ Rendering placeholder row after failed fetch");
            }
            lines.push(EMPTY_ROW.to_string());
        } else {
            for m in matches {
                lines.push(self.render_row(m)?);
            }
        }

        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(FOOTER.to_string());

        let mut markdown = lines.join("\n");
        markdown.push('\n');

        Ok(RenderedReport {
            target_date: outcome.target_date,
            markdown,
            row_count: matches.len(),
            placeholder: matches.is_empty(),
        })
    }

    fn render_row(&self, m: &Match) -> Result<String> {
        let kick_off = to_display_time(&m.start_date, self.source_tz, self.display_tz)?;
        let odds = m
            .predicted_odds()
            .unwrap_or_else(|| ODDS_PLACEHOLDER.to_string());

        Ok(format!(
            "| {} | {} | {} | {} | {} |",
            kick_off.format("%Y-%m-%d %H:%M"),
            escape_cell(&m.home_team),
            escape_cell(&m.away_team),
            escape_cell(&m.prediction),
            escape_cell(&odds)
        ))
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
