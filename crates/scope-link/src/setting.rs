//! Device setting reports
//!
//! The device periodically reports its sampling refresh rate as a
//! `SETTING` payload of the form `name:value`, e.g. `rate:500`.

use crate::error::ParseError;

/// A parsed setting report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettingReport {
    /// Setting name as sent by the device
    pub name: String,
    /// Refresh rate in milliseconds
    pub refresh_ms: u64,
}

impl SettingReport {
    /// Parse a `SETTING` payload
    ///
    /// Only the first two `:`-separated fields are considered.
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut fields = payload.split(':');
        let name = fields.next().unwrap_or_default().trim();
        let value = fields
            .next()
            .ok_or_else(|| ParseError::MissingSeparator(payload.to_string()))?
            .trim();

        let refresh_ms = value
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidSetting(value.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            refresh_ms,
        })
    }

    /// Format the chart title for this report
    pub fn title(&self, base: &str) -> String {
        format!("{} {{ Refresh rate: {}ms }}", base, self.refresh_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate() {
        let report = SettingReport::parse("rate:500").unwrap();
        assert_eq!(report.name, "rate");
        assert_eq!(report.refresh_ms, 500);
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let report = SettingReport::parse("rate: 250 :x").unwrap();
        assert_eq!(report.refresh_ms, 250);
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            SettingReport::parse("rate500"),
            Err(ParseError::MissingSeparator("rate500".to_string()))
        );
    }

    #[test]
    fn test_non_numeric_value() {
        assert_eq!(
            SettingReport::parse("rate:fast"),
            Err(ParseError::InvalidSetting("fast".to_string()))
        );
    }

    #[test]
    fn test_title() {
        let report = SettingReport::parse("rate:500").unwrap();
        assert_eq!(
            report.title("Temperature Samples"),
            "Temperature Samples { Refresh rate: 500ms }"
        );
    }
}
