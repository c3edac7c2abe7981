use std::collections::BTreeMap;

use enumset::{EnumSet, EnumSetType};
use serde::Serialize;

use crate::normalize;

/// 1 therm in kilowatt-hours, for feeding gas usage to an energy dashboard.
pub const THERM_KILOWATT_HOURS: f64 = 29.3001;

/// A tracked utility type.
#[derive(Debug, EnumSetType, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[display("electric")]
    Electric,

    #[display("gas")]
    Gas,
}

impl Category {
    /// Unit the portal reports usage in.
    #[must_use]
    pub const fn usage_unit(self) -> &'static str {
        match self {
            Self::Electric => "kWh",
            Self::Gas => "therm",
        }
    }
}

/// Usage, cost, and next-meter-reading date for one category, each field
/// independently optional.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[must_use]
pub struct Reading {
    /// Numeric usage text, unit suffix discarded.
    pub usage: Option<String>,

    /// Decimal cost text, currency symbol stripped.
    pub cost: Option<String>,

    /// Next-meter-reading date, canonical `YYYY-MM-DD` when recognized.
    pub reading_date: Option<String>,
}

impl Reading {
    pub const fn is_complete(&self) -> bool {
        self.usage.is_some() && self.cost.is_some() && self.reading_date.is_some()
    }

    /// Usage in kilowatt-hours: gas readings arrive in therms and get
    /// converted, electric readings pass through.
    #[must_use]
    pub fn usage_kilowatt_hours(&self, category: Category) -> Option<f64> {
        let usage = normalize::decimal(self.usage.as_deref()?)?;
        Some(match category {
            Category::Electric => usage,
            Category::Gas => usage * THERM_KILOWATT_HOURS,
        })
    }

    pub(crate) fn fill_usage(&mut self, value: Option<String>) {
        Self::fill(&mut self.usage, value);
    }

    pub(crate) fn fill_cost(&mut self, value: Option<String>) {
        Self::fill(&mut self.cost, value);
    }

    pub(crate) fn fill_reading_date(&mut self, value: Option<String>) {
        Self::fill(&mut self.reading_date, value);
    }

    /// First non-empty value wins; a missed extraction never clobbers.
    fn fill(slot: &mut Option<String>, value: Option<String>) {
        if slot.is_none()
            && let Some(value) = value
            && !value.is_empty()
        {
            *slot = Some(value);
        }
    }

    /// Takes over the newer cycle's values; fields the newer cycle failed to
    /// extract keep their previously known values.
    pub(crate) fn absorb(&mut self, newer: Self) {
        Self::absorb_field(&mut self.usage, newer.usage);
        Self::absorb_field(&mut self.cost, newer.cost);
        Self::absorb_field(&mut self.reading_date, newer.reading_date);
    }

    fn absorb_field(slot: &mut Option<String>, newer: Option<String>) {
        if let Some(value) = newer
            && !value.is_empty()
        {
            *slot = Some(value);
        }
    }
}

/// The merged per-category readings of a fetch.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[must_use]
pub struct Readings {
    pub electric: Reading,
    pub gas: Reading,
}

impl Readings {
    pub const fn get(&self, category: Category) -> &Reading {
        match category {
            Category::Electric => &self.electric,
            Category::Gas => &self.gas,
        }
    }

    pub(crate) const fn get_mut(&mut self, category: Category) -> &mut Reading {
        match category {
            Category::Electric => &mut self.electric,
            Category::Gas => &mut self.gas,
        }
    }

    pub(crate) fn absorb(&mut self, newer: Self) {
        self.electric.absorb(newer.electric);
        self.gas.absorb(newer.gas);
    }

    /// Flat mapping for the host platform: `{category}_usage`,
    /// `{category}_cost`, and `{category}_reading_date`, absent fields omitted.
    #[must_use]
    pub fn to_state_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for category in EnumSet::<Category>::all() {
            let reading = self.get(category);
            if let Some(usage) = &reading.usage {
                map.insert(format!("{category}_usage"), usage.clone());
            }
            if let Some(cost) = &reading.cost {
                map.insert(format!("{category}_cost"), cost.clone());
            }
            if let Some(reading_date) = &reading.reading_date {
                map.insert(format!("{category}_reading_date"), reading_date.clone());
            }
        }
        map
    }
}
