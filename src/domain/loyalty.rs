/// One point per whole currency unit of the order total.
pub fn points_for_total(total_cents: i64) -> i64 {
    total_cents.max(0) / 100
}

/// Every hundred points is worth one reward credit.
pub fn reward_credits(points: i64) -> i64 {
    points.max(0) / 100
}
