//! Field extraction: locators evaluated against a response body.
//!
//! Extraction failures are never fatal. The portal's markup drifts across
//! front-end versions, so every field gets an ordered locator list and a miss
//! just leaves the field absent.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::{normalize, prelude::*, reading::Reading};

/// One way to find a field in a response body.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Locator {
    /// CSS selector; the element's text content is the value.
    Css(&'static str),

    /// Regular expression with a single capture group.
    Pattern(&'static str),

    /// Key path into a JSON body.
    JsonPath(&'static [&'static str]),
}

impl Locator {
    /// Runs the locator; a structural mismatch of any kind yields `None`.
    fn evaluate(self, body: &str) -> Option<String> {
        let text = match self {
            Self::Css(selector) => {
                let selector = Selector::parse(selector).ok()?;
                let document = Html::parse_document(body);
                let element = document.select(&selector).next()?;
                element.text().collect::<String>()
            }
            Self::Pattern(pattern) => {
                let regex = Regex::new(pattern).ok()?;
                regex.captures(body)?.get(1)?.as_str().to_owned()
            }
            Self::JsonPath(path) => {
                let root: Value = serde_json::from_str(body).ok()?;
                let mut value = &root;
                for key in path {
                    value = value.get(key)?;
                }
                match value {
                    Value::String(text) => text.clone(),
                    Value::Number(number) => number.to_string(),
                    _ => return None,
                }
            }
        };
        let text = text.trim().to_owned();
        (!text.is_empty()).then_some(text)
    }
}

/// Ordered locator lists for the three fields of one page.
pub(crate) struct FieldLocators {
    pub usage: &'static [Locator],
    pub cost: &'static [Locator],
    pub reading_date: &'static [Locator],
}

/// Fills the still-missing fields of `reading` from `body`.
pub(crate) fn fill_reading(reading: &mut Reading, body: &str, locators: &FieldLocators) {
    if reading.usage.is_none() {
        reading.fill_usage(
            first_match(body, locators.usage).and_then(|raw| normalize::usage(&raw)),
        );
    }
    if reading.cost.is_none() {
        reading.fill_cost(
            first_match(body, locators.cost).and_then(|raw| normalize::currency(&raw)),
        );
    }
    if reading.reading_date.is_none() {
        reading.fill_reading_date(
            first_match(body, locators.reading_date)
                .and_then(|raw| normalize::reading_date(&raw)),
        );
    }
}

fn first_match(body: &str, locators: &[Locator]) -> Option<String> {
    for locator in locators {
        if let Some(value) = locator.evaluate(body) {
            return Some(value);
        }
        debug!(?locator, "locator missed");
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::{portal, reading::Category};

    use super::*;

    #[test]
    fn test_css_extracts_element_text() {
        // language=html
        let body = r#"<div class="usage-box"><span class="usage-value"> 437 kWh </span></div>"#;
        let value = Locator::Css("div.usage-box span.usage-value").evaluate(body);
        assert_eq!(value.as_deref(), Some("437 kWh"));
    }

    #[test]
    fn test_pattern_extracts_capture_group() {
        // language=html
        let body = r#"<script>window.__data = {"electricUsage":"437"};</script>"#;
        let value = Locator::Pattern(r#""electricUsage"\s*:\s*"([^"]+)""#).evaluate(body);
        assert_eq!(value.as_deref(), Some("437"));
    }

    #[test]
    fn test_json_path_descends_keys() {
        // language=json
        let body = r#"{"usage": {"value": 56.0}, "cost": {"value": "$78.90"}}"#;
        assert_eq!(Locator::JsonPath(&["usage", "value"]).evaluate(body).as_deref(), Some("56.0"));
        assert_eq!(Locator::JsonPath(&["cost", "value"]).evaluate(body).as_deref(), Some("$78.90"));
    }

    #[test]
    fn test_malformed_bodies_yield_absent() {
        let bodies = [
            "",
            "<html><body><div class",
            r#"{"usage": "#,
            "<html><body><p>maintenance window</p></body></html>",
            r#"{"usage": {"value": null}}"#,
        ];
        for body in bodies {
            assert!(Locator::Css("div.usage-box span.usage-value").evaluate(body).is_none());
            assert!(Locator::Pattern(r#""usageValue":"([^"]+)""#).evaluate(body).is_none());
            assert!(Locator::JsonPath(&["usage", "value"]).evaluate(body).is_none());
        }
    }

    #[test]
    fn test_fill_reading_leaves_missing_fields_absent() {
        // language=html
        let body = r#"
            <html><body>
            <div class="usage-box electric"><span class="usage-value">437 kWh</span></div>
            </body></html>
        "#;
        let mut reading = Reading::default();
        fill_reading(&mut reading, body, &portal::dashboard_locators(Category::Electric));
        assert_eq!(reading.usage.as_deref(), Some("437"));
        assert!(reading.cost.is_none());
        assert!(reading.reading_date.is_none());
    }

    #[test]
    fn test_fill_reading_does_not_clobber() {
        // language=html
        let body = r#"
            <html><body>
            <div class="usage-box electric"><span class="usage-value">999 kWh</span></div>
            <div class="cost-box electric"><span class="cost-value">$123.45</span></div>
            </body></html>
        "#;
        let mut reading = Reading { usage: Some("437".to_owned()), ..Reading::default() };
        fill_reading(&mut reading, body, &portal::dashboard_locators(Category::Electric));
        assert_eq!(reading.usage.as_deref(), Some("437"));
        assert_eq!(reading.cost.as_deref(), Some("123.45"));
    }
}
