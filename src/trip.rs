use crate::error::FormError;
use anyhow::Context;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-person budgets below this still go through, with a warning.
pub const LOW_BUDGET_THRESHOLD: u32 = 500;
pub const MAX_TRAVELERS: u32 = 20;

pub const DEFAULT_TRANSPORT: &str = "public transport";
pub const DEFAULT_DIETARY: &str = "no special requirements";

/// Body of `POST /plan_travel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripForm {
    pub source: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget_per_person: u32,
    pub travelers: u32,
    pub accommodation_type: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub transportation_mode: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

/// Tomorrow and one week after that.
pub fn default_dates(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.checked_add_days(Days::new(1)).unwrap_or(today);
    let end = start.checked_add_days(Days::new(7)).unwrap_or(start);
    (start, end)
}

impl TripForm {
    /// Read a form from a TOML file with the same keys as the request body.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trip form: {}", path.display()))?;
        let form: TripForm = toml::from_str(&s)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;
        Ok(form)
    }

    /// Check required fields and ranges. Returns non-fatal warnings.
    pub fn validate(&self) -> Result<Vec<String>, FormError> {
        if self.source.trim().is_empty() {
            return Err(FormError::Missing("source"));
        }
        if self.destination.trim().is_empty() {
            return Err(FormError::Missing("destination"));
        }
        if self.budget_per_person == 0 {
            return Err(FormError::Missing("budget_per_person"));
        }
        if self.travelers == 0 {
            return Err(FormError::Missing("travelers"));
        }
        if self.accommodation_type.trim().is_empty() {
            return Err(FormError::Missing("accommodation_type"));
        }
        if self.preferences.iter().all(|p| p.trim().is_empty()) {
            return Err(FormError::NoPreferences);
        }
        if self.travelers > MAX_TRAVELERS {
            return Err(FormError::Travelers(self.travelers));
        }
        if self.end_date < self.start_date {
            return Err(FormError::DateOrder {
                start: self.start_date,
                end: self.end_date,
            });
        }

        let mut warnings = Vec::new();
        if self.budget_per_person < LOW_BUDGET_THRESHOLD {
            warnings.push(format!(
                "a budget of {} per person may not allow a quality itinerary",
                self.budget_per_person
            ));
        }
        Ok(warnings)
    }

    /// Fill the optional lists the backend expects to be non-empty.
    pub fn apply_defaults(&mut self) {
        if self.transportation_mode.is_empty() {
            self.transportation_mode = vec![DEFAULT_TRANSPORT.to_string()];
        }
        if self.dietary_restrictions.is_empty() {
            self.dietary_restrictions = vec![DEFAULT_DIETARY.to_string()];
        }
    }

    pub fn total_budget(&self) -> u64 {
        u64::from(self.budget_per_person) * u64::from(self.travelers)
    }

    /// Markdown summary shown as the user's side of a plan turn.
    pub fn summary(&self) -> String {
        format!(
            "🧳 **Trip planning request**\n\n\
             **Basics:**\n\
             - 📍 From: {}\n\
             - 🎯 To: {}\n\
             - 📅 Dates: {} to {}\n\
             - 💰 Budget per person: ¥{} (about ¥{} in total)\n\
             - 👥 Travelers: {}\n\
             - 🏨 Accommodation: {}\n\n\
             **Preferences:** {}\n\
             **Transport:** {}\n\
             **Dietary needs:** {}",
            self.source,
            self.destination,
            self.start_date,
            self.end_date,
            self.budget_per_person,
            self.total_budget(),
            self.travelers,
            self.accommodation_type,
            self.preferences.join(", "),
            self.transportation_mode.join(", "),
            self.dietary_restrictions.join(", "),
        )
    }
}
