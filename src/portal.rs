//! The fixed PSE&G My Account surface: URLs, markers, and field locators.

use crate::{
    extract::{FieldLocators, Locator},
    reading::Category,
};

/// The New Jersey portal; Long Island deployments override this.
pub const DEFAULT_BASE_URL: &str = "https://nj.myaccount.pseg.com";

pub(crate) const USERNAME_FIELD: &str = "username";
pub(crate) const PASSWORD_FIELD: &str = "password";

pub(crate) const ENERGIZE_ID_COOKIE: &str = "EnergizeID";
pub(crate) const SESSION_ID_COOKIE: &str = "ASP.NET_SessionId";

/// Present in the body of every authenticated page (the logout link).
pub(crate) const LOGGED_IN_MARKER: &str = "/user/logout";

/// Error banner class rendered when the login form rejects the credentials.
pub(crate) const LOGIN_ERROR_MARKER: &str = "login-error";

pub(crate) fn login_url(base_url: &str) -> String {
    format!("{}/user/login", base_url.trim_end_matches('/'))
}

pub(crate) fn logout_url(base_url: &str) -> String {
    format!("{}/user/logout", base_url.trim_end_matches('/'))
}

pub(crate) fn dashboard_url(base_url: &str) -> String {
    format!("{}/dashboard", base_url.trim_end_matches('/'))
}

pub(crate) fn category_url(base_url: &str, category: Category) -> String {
    format!("{}/myusage/{category}", base_url.trim_end_matches('/'))
}

/// Dashboard locators are category-scoped: the aggregate view renders one
/// usage/cost widget pair per category. The regex fallbacks pick the values
/// out of the inline bootstrap JSON that newer portal versions ship instead.
pub(crate) const fn dashboard_locators(category: Category) -> FieldLocators {
    match category {
        Category::Electric => FieldLocators {
            usage: &[
                Locator::Css("div.usage-box.electric span.usage-value"),
                Locator::Pattern(r#""electricUsage"\s*:\s*"([^"]+)""#),
            ],
            cost: &[
                Locator::Css("div.cost-box.electric span.cost-value"),
                Locator::Pattern(r#""electricCost"\s*:\s*"([^"]+)""#),
            ],
            reading_date: &[
                Locator::Css("p.next-meter-reading.electric"),
                Locator::Css("p.next-meter-reading"),
                Locator::Pattern(r#""nextMeterReading"\s*:\s*"([^"]+)""#),
            ],
        },
        Category::Gas => FieldLocators {
            usage: &[
                Locator::Css("div.usage-box.gas span.usage-value"),
                Locator::Pattern(r#""gasUsage"\s*:\s*"([^"]+)""#),
            ],
            cost: &[
                Locator::Css("div.cost-box.gas span.cost-value"),
                Locator::Pattern(r#""gasCost"\s*:\s*"([^"]+)""#),
            ],
            reading_date: &[
                Locator::Css("p.next-meter-reading.gas"),
                Locator::Css("p.next-meter-reading"),
                Locator::Pattern(r#""nextMeterReading"\s*:\s*"([^"]+)""#),
            ],
        },
    }
}

/// A dedicated category page renders a single widget, so its locators are not
/// category-scoped. Some portal versions serve the widget as JSON; the JSON
/// paths cover those.
pub(crate) const fn category_locators() -> FieldLocators {
    FieldLocators {
        usage: &[
            Locator::Css("div.usage-box span.usage-value"),
            Locator::JsonPath(&["usage", "value"]),
            Locator::Pattern(r#""usageValue"\s*:\s*"([^"]+)""#),
        ],
        cost: &[
            Locator::Css("div.cost-box span.cost-value"),
            Locator::JsonPath(&["cost", "value"]),
            Locator::Pattern(r#""costValue"\s*:\s*"([^"]+)""#),
        ],
        reading_date: &[
            Locator::Css("p.next-meter-reading"),
            Locator::JsonPath(&["nextMeterReading"]),
        ],
    }
}
