//! Substring classifiers for free-text event payloads.
//!
//! Every classifier is an ordered rule table: the first rule whose needle
//! occurs in the payload wins, and unmatched payloads fall through to an
//! explicit Unknown/Other label. The tables make the match priority part of
//! the interface instead of an accident of `if` ordering.

use std::fmt::Display;

/// The store a home-page banner promotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Store {
    CitySuper,
    Friday,
    Sogo,
    FarEastern,
    Amart,
    Others,
}

impl Store {
    pub fn as_str(&self) -> &'static str {
        match self {
            Store::CitySuper => "city'super",
            Store::Friday => "friDay",
            Store::Sogo => "SOGO",
            Store::FarEastern => "Far Eastern Dept.",
            Store::Amart => "a-mart",
            Store::Others => "Others",
        }
    }
}

impl Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const STORE_RULES: &[(&str, Store)] = &[
    ("city", Store::CitySuper),
    ("friDay", Store::Friday),
    ("全站商品", Store::Friday),
    ("SOGO", Store::Sogo),
    ("遠東百貨", Store::FarEastern),
    ("愛買線上購物", Store::Amart),
];

pub fn banner_store(content: &str) -> Store {
    STORE_RULES
        .iter()
        .find(|(needle, _)| content.contains(needle))
        .map(|(_, store)| *store)
        .unwrap_or(Store::Others)
}

/// The marketing category of a home-page click event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarketingCategory {
    FCoinClaim,
    CouponClaim,
    LifestylePicks,
    AdBanner,
    PreferenceTag,
    DailyDeals,
    ProductClick,
    Other,
}

impl MarketingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketingCategory::FCoinClaim => "F-coin claim",
            MarketingCategory::CouponClaim => "Coupon claim",
            MarketingCategory::LifestylePicks => "Lifestyle picks",
            MarketingCategory::AdBanner => "Ad banner",
            MarketingCategory::PreferenceTag => "Preference tag",
            MarketingCategory::DailyDeals => "Daily deals",
            MarketingCategory::ProductClick => "Product click",
            MarketingCategory::Other => "Other",
        }
    }
}

impl Display for MarketingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const BANNER_CLICK_RULES: &[(&str, MarketingCategory)] = &[
    ("f幣", MarketingCategory::FCoinClaim),
    ("折價券", MarketingCategory::CouponClaim),
    ("生活提案", MarketingCategory::LifestylePicks),
];

/// Classifies a home-page click by event name and content payload. Payloads
/// that match no rule get the event's catch-all category; unknown events map
/// to [`MarketingCategory::Other`].
pub fn marketing_category(event: &str, content: &str) -> MarketingCategory {
    match event {
        "mt_home_banner_click" => BANNER_CLICK_RULES
            .iter()
            .find(|(needle, _)| content.contains(needle))
            .map(|(_, category)| *category)
            .unwrap_or(MarketingCategory::AdBanner),
        "mt_home_promo_click" => {
            // "good deal" text shows up under both promo and product clicks;
            // the preference-tag needle is checked first on purpose.
            if content.contains("喜好") {
                MarketingCategory::PreferenceTag
            } else {
                MarketingCategory::DailyDeals
            }
        }
        "mt_home_product_click" => {
            if content.contains("好康") {
                MarketingCategory::DailyDeals
            } else {
                MarketingCategory::ProductClick
            }
        }
        _ => MarketingCategory::Other,
    }
}

/// Where a search keyword came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchSource {
    History,
    Popular,
    Voice,
    Keyboard,
    Unknown,
}

impl SearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::History => "History",
            SearchSource::Popular => "Popular",
            SearchSource::Voice => "Voice input",
            SearchSource::Keyboard => "Keyboard",
            SearchSource::Unknown => "Unknown",
        }
    }
}

impl Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const SEARCH_SOURCE_RULES: &[(&str, SearchSource)] = &[
    ("history", SearchSource::History),
    ("popular", SearchSource::Popular),
    ("ATT", SearchSource::Voice),
];

/// Classifies a `search_use` payload. Keyboard searches leave no payload
/// marker, so [`SearchSource::Keyboard`] is never returned here; the
/// operations report derives it as the unclassified remainder.
pub fn search_source(content: &str) -> SearchSource {
    SEARCH_SOURCE_RULES
        .iter()
        .find(|(needle, _)| content.contains(needle))
        .map(|(_, source)| *source)
        .unwrap_or(SearchSource::Unknown)
}

/// The chart label for a funnel operation event.
pub fn operation_label(event: &str) -> &str {
    match event {
        "add_to_cart" => "Add to cart",
        "checkout_progress" => "Cart step 2",
        "ecommerce_purchase" => "Checkout done",
        "search" => "Search",
        "view_item" => "View item",
        "begin_check" => "Begin checkout",
        other => other,
    }
}

/// Extracts the `{topic}` suffix of a banner content string of the form
/// `...banner@{topic}`. Returns `None` when the marker is absent.
pub fn banner_topic(content: &str) -> Option<&str> {
    let index = content.find("@{")?;
    let topic = &content[index + 2..];
    Some(topic.strip_suffix('}').unwrap_or(topic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_rules_match_in_priority_order() {
        assert_eq!(banner_store("city'super 週年慶"), Store::CitySuper);
        assert_eq!(banner_store("friDay 全站商品"), Store::Friday);
        assert_eq!(banner_store("全站商品大賞"), Store::Friday);
        assert_eq!(banner_store("SOGO 特賣"), Store::Sogo);
        assert_eq!(banner_store("遠東百貨秋季展"), Store::FarEastern);
        assert_eq!(banner_store("愛買線上購物日"), Store::Amart);
        // "city" outranks "SOGO" when both substrings occur
        assert_eq!(banner_store("city x SOGO 聯名"), Store::CitySuper);
    }

    #[test]
    fn store_fallback_is_others() {
        assert_eq!(banner_store("something unbranded"), Store::Others);
        assert_eq!(banner_store(""), Store::Others);
    }

    #[test]
    fn banner_click_categories() {
        assert_eq!(
            marketing_category("mt_home_banner_click", "領f幣"),
            MarketingCategory::FCoinClaim
        );
        assert_eq!(
            marketing_category("mt_home_banner_click", "折價券大放送"),
            MarketingCategory::CouponClaim
        );
        assert_eq!(
            marketing_category("mt_home_banner_click", "生活提案: 夏日"),
            MarketingCategory::LifestylePicks
        );
        assert_eq!(
            marketing_category("mt_home_banner_click", "banner@{summer}"),
            MarketingCategory::AdBanner
        );
        // f幣 outranks 折價券 when both substrings occur
        assert_eq!(
            marketing_category("mt_home_banner_click", "f幣加折價券"),
            MarketingCategory::FCoinClaim
        );
    }

    #[test]
    fn promo_and_product_clicks_overlap_on_deals() {
        assert_eq!(
            marketing_category("mt_home_promo_click", "喜好標籤"),
            MarketingCategory::PreferenceTag
        );
        assert_eq!(
            marketing_category("mt_home_promo_click", "大好康"),
            MarketingCategory::DailyDeals
        );
        assert_eq!(
            marketing_category("mt_home_product_click", "好康推薦"),
            MarketingCategory::DailyDeals
        );
        assert_eq!(
            marketing_category("mt_home_product_click", "個人興趣推薦"),
            MarketingCategory::ProductClick
        );
    }

    #[test]
    fn unknown_event_maps_to_other() {
        assert_eq!(marketing_category("mt_footer_click", "好康"), MarketingCategory::Other);
    }

    #[test]
    fn search_sources_are_total() {
        assert_eq!(search_source("search_use:history"), SearchSource::History);
        assert_eq!(search_source("search_use:popular"), SearchSource::Popular);
        assert_eq!(search_source("search_use:ATT"), SearchSource::Voice);
        assert_eq!(search_source("search_use:???"), SearchSource::Unknown);
    }

    #[test]
    fn operation_labels_fall_back_to_the_event_name() {
        assert_eq!(operation_label("add_to_cart"), "Add to cart");
        assert_eq!(operation_label("session_start"), "session_start");
    }

    #[test]
    fn banner_topics() {
        assert_eq!(banner_topic("homeBanner@{暑期特賣}"), Some("暑期特賣"));
        assert_eq!(banner_topic("homeBanner@{null}"), Some("null"));
        assert_eq!(banner_topic("no marker here"), None);
        // tolerate a missing closing brace
        assert_eq!(banner_topic("banner@{open"), Some("open"));
    }
}
