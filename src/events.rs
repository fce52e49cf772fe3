use serde::Deserialize;

/// A `session_start` event row.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRow {
    /// The pseudonymous device id.
    pub id: String,
    /// Event timestamp in microseconds since the Unix epoch.
    pub ts: i64,
}

/// A home-page marketing click row (promo, banner, or product click).
#[derive(Debug, Clone, Deserialize)]
pub struct MarketingRow {
    pub event: String,
    pub platform: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Per-platform `session_start` totals.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionCountRow {
    pub count: u64,
    pub platform: String,
}

/// A `UIOperation` search event row.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRow {
    pub platform: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// A funnel operation event row (search, add_to_cart, purchase, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRow {
    pub event: String,
    pub platform: String,
}

/// An `ecommerce_purchase` row. The order value is scattered over four
/// parameter encodings depending on app version; see [`resolve_revenue`].
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRow {
    pub time: i64,
    #[serde(default)]
    pub double_value: Option<f64>,
    #[serde(default)]
    pub int_value: Option<i64>,
    #[serde(default)]
    pub double_price: Option<f64>,
    #[serde(default)]
    pub int_price: Option<i64>,
}

/// A bare (event name, timestamp) row, used for the per-day conversion
/// funnel counts.
#[derive(Debug, Clone, Deserialize)]
pub struct EventTimeRow {
    pub event: String,
    pub time: i64,
}

/// A home-page banner click row. Banner counts are not segmented by
/// platform, so only the content payload is selected.
#[derive(Debug, Clone, Deserialize)]
pub struct BannerRow {
    #[serde(default)]
    pub content: Option<String>,
}

/// Picks the order value out of the candidate parameter fields. Candidates
/// are tried in declared priority order (value before price, double before
/// int); the first one that is present and non-zero wins, regardless of
/// magnitude. Returns `None` when every candidate is missing or zero.
pub fn resolve_revenue(purchase: &PurchaseRow) -> Option<f64> {
    let candidates = [
        purchase.double_value,
        purchase.int_value.map(|v| v as f64),
        purchase.double_price,
        purchase.int_price.map(|v| v as f64),
    ];
    candidates.into_iter().flatten().find(|v| *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(
        double_value: Option<f64>,
        int_value: Option<i64>,
        double_price: Option<f64>,
        int_price: Option<i64>,
    ) -> PurchaseRow {
        PurchaseRow { time: 0, double_value, int_value, double_price, int_price }
    }

    #[test]
    fn first_non_zero_candidate_wins() {
        let row = purchase(Some(0.0), Some(5), Some(3.0), Some(0));
        assert_eq!(resolve_revenue(&row), Some(5.0));
    }

    #[test]
    fn priority_is_declared_order_not_magnitude() {
        let row = purchase(Some(1.0), Some(9999), None, None);
        assert_eq!(resolve_revenue(&row), Some(1.0));
    }

    #[test]
    fn missing_candidates_are_skipped() {
        let row = purchase(None, None, None, Some(42));
        assert_eq!(resolve_revenue(&row), Some(42.0));
    }

    #[test]
    fn all_zero_or_missing_yields_none() {
        let row = purchase(Some(0.0), Some(0), None, Some(0));
        assert_eq!(resolve_revenue(&row), None);
        let row = purchase(None, None, None, None);
        assert_eq!(resolve_revenue(&row), None);
    }
}
