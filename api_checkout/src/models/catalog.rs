/// Subscription plans sold on the pricing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Plan {
    Starter,
    Growing,
    Pro,
    MarketerLeader,
}

impl Plan {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "starter" => Some(Plan::Starter),
            "growing" => Some(Plan::Growing),
            "pro" => Some(Plan::Pro),
            "marketer-leader" => Some(Plan::MarketerLeader),
            _ => None,
        }
    }
}

/// Billing cadences offered for every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BillingPeriod {
    Monthly,
    ThreeMonths,
}

impl BillingPeriod {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "monthly" => Some(BillingPeriod::Monthly),
            "3-months" => Some(BillingPeriod::ThreeMonths),
            _ => None,
        }
    }
}

/// Add-on tiers offered on the pricing page. Zero means "no add-on" and is
/// a valid request value that never maps to a price.
pub(crate) const ALLOWED_ADDON_AMOUNTS: [i64; 6] = [0, 100, 200, 300, 400, 500];

pub(crate) fn is_allowed_addon_amount(amount: i64) -> bool {
    ALLOWED_ADDON_AMOUNTS.contains(&amount)
}

/// Maps a (plan, period) pair to its Stripe price. Unknown names do not
/// resolve; the caller decides how to report that.
pub(crate) fn resolve_plan_price(plan: &str, period: &str) -> Option<&'static str> {
    let plan = Plan::parse(plan)?;
    let period = BillingPeriod::parse(period)?;

    let price = match (plan, period) {
        (Plan::Starter, BillingPeriod::Monthly) => "price_1R8xKcE2nVqLdTwY4u9ZbQ3M",
        (Plan::Starter, BillingPeriod::ThreeMonths) => "price_1R8xLyE2nVqLdTwYhG7sN2fK",
        (Plan::Growing, BillingPeriod::Monthly) => "price_1R8xMvE2nVqLdTwYcJ5tP8dR",
        (Plan::Growing, BillingPeriod::ThreeMonths) => "price_1R8xNqE2nVqLdTwYxW2mK6hT",
        (Plan::Pro, BillingPeriod::Monthly) => "price_1R8xPjE2nVqLdTwYfB4vL9sC",
        (Plan::Pro, BillingPeriod::ThreeMonths) => "price_1R8xQwE2nVqLdTwYkM6nD3gX",
        (Plan::MarketerLeader, BillingPeriod::Monthly) => "price_1R8xRtE2nVqLdTwYzS8pF5jV",
        (Plan::MarketerLeader, BillingPeriod::ThreeMonths) => "price_1R8xSnE2nVqLdTwYqH3rW7bN",
    };

    Some(price)
}

/// Maps an add-on tier to its Stripe price. Zero and unknown amounts do
/// not resolve.
pub(crate) fn resolve_addon_price(amount: i64) -> Option<&'static str> {
    match amount {
        100 => Some("price_1R8xTgE2nVqLdTwYvC5kJ2mP"),
        200 => Some("price_1R8xUdE2nVqLdTwYbN7hR4tL"),
        300 => Some("price_1R8xVzE2nVqLdTwYmX9dG6wQ"),
        400 => Some("price_1R8xWsE2nVqLdTwYtK2fS8vB"),
        500 => Some("price_1R8xXnE2nVqLdTwYgD4jH3cZ"),
        _ => None,
    }
}

/// Every (plan, period) pair the catalog sells, in wire spelling.
#[cfg(test)]
pub(crate) const VALID_PAIRS: [(&str, &str); 8] = [
    ("Starter", "Monthly"),
    ("Starter", "3-Months"),
    ("Growing", "Monthly"),
    ("Growing", "3-Months"),
    ("Pro", "Monthly"),
    ("Pro", "3-Months"),
    ("Marketer-Leader", "Monthly"),
    ("Marketer-Leader", "3-Months"),
];
