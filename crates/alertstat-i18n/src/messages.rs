//! Type-safe message accessors over the embedded Fluent catalogue.

use alertstat_common::{AlertStatError, Result};
use chrono::Weekday;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use tracing::debug;
use unic_langid::LanguageIdentifier;

use crate::pluralization::plural_days;

const RU_RESOURCE: &str = include_str!("../locales/ru/alertstat.ftl");

/// Message catalogue for the report corpus.
pub struct Messages {
    bundle: FluentBundle<FluentResource>,
}

impl std::fmt::Debug for Messages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messages").field("bundle", &"<FluentBundle>").finish()
    }
}

impl Messages {
    /// Loads the Russian catalogue.
    pub fn russian() -> Result<Self> {
        Self::from_source("ru", RU_RESOURCE)
    }

    /// Loads a catalogue from Fluent source text.
    pub fn from_source(locale: &str, source: &str) -> Result<Self> {
        let langid: LanguageIdentifier = locale
            .parse()
            .map_err(|e| AlertStatError::localization(format!("invalid locale {locale:?}: {e:?}")))?;

        let resource = FluentResource::try_new(source.to_string()).map_err(|(_, errors)| {
            AlertStatError::localization(format!("{} syntax errors in catalogue", errors.len()))
        })?;

        let mut bundle = FluentBundle::new_concurrent(vec![langid]);
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| AlertStatError::localization(format!("{errors:?}")))?;

        debug!(locale, "Message catalogue loaded");
        Ok(Self { bundle })
    }

    /// Gets a message without arguments.
    pub fn get(&self, key: &str) -> Result<String> {
        self.format(key, None)
    }

    /// Gets a message with string arguments.
    pub fn get_with_args(&self, key: &str, args: &[(&str, String)]) -> Result<String> {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, value.clone());
        }
        self.format(key, Some(&fluent_args))
    }

    fn format(&self, key: &str, args: Option<&FluentArgs>) -> Result<String> {
        let message = self
            .bundle
            .get_message(key)
            .ok_or_else(|| AlertStatError::localization(format!("unknown message {key:?}")))?;
        let pattern = message
            .value()
            .ok_or_else(|| AlertStatError::localization(format!("message {key:?} has no value")))?;

        let mut errors = Vec::new();
        let formatted = self
            .bundle
            .format_pattern(pattern, args, &mut errors)
            .into_owned();
        if !errors.is_empty() {
            return Err(AlertStatError::localization(format!(
                "formatting {key:?} failed: {errors:?}"
            )));
        }
        Ok(formatted)
    }

    fn with_days(&self, key: &str, days: u32) -> Result<String> {
        self.get_with_args(
            key,
            &[
                ("days", days.to_string()),
                ("days_word", plural_days(i64::from(days)).to_string()),
            ],
        )
    }

    /// Report caption without the trailing marker tag.
    pub fn report_caption(&self, days: u32, mean: f64, median: f64, total: u64) -> Result<String> {
        self.get_with_args(
            "report-caption",
            &[
                ("days", days.to_string()),
                ("days_word", plural_days(i64::from(days)).to_string()),
                ("mean", format!("{mean:.2}")),
                ("median", format!("{median:.2}")),
                ("total", total.to_string()),
            ],
        )
    }

    /// Title of the per-day chart.
    pub fn daily_title(&self, days: u32) -> Result<String> {
        self.with_days("chart-daily-title", days)
    }

    /// Title of the hour-received chart.
    pub fn hourly_title(&self, days: u32) -> Result<String> {
        self.with_days("chart-hourly-title", days)
    }

    /// Title of the hour-extracted chart.
    pub fn extracted_title(&self, days: u32) -> Result<String> {
        self.with_days("chart-extracted-title", days)
    }

    /// Legend entry for the mean reference line.
    pub fn legend_mean(&self, value: f64) -> Result<String> {
        self.get_with_args("legend-mean", &[("value", format!("{value:.2}"))])
    }

    /// Legend entry for the median reference line.
    pub fn legend_median(&self, value: f64) -> Result<String> {
        self.get_with_args("legend-median", &[("value", format!("{value:.2}"))])
    }

    /// Full weekday name.
    pub fn weekday(&self, weekday: Weekday) -> Result<String> {
        let key = match weekday {
            Weekday::Mon => "weekday-mon",
            Weekday::Tue => "weekday-tue",
            Weekday::Wed => "weekday-wed",
            Weekday::Thu => "weekday-thu",
            Weekday::Fri => "weekday-fri",
            Weekday::Sat => "weekday-sat",
            Weekday::Sun => "weekday-sun",
        };
        self.get(key)
    }
}
