//! Monetary value rules for gifts, memberships and paid messages.
//!
//! All results are in the base currency unit (yuan-equivalent) and are
//! never negative. Consumers must not rescale them.

use super::upstream_event::{GiftMessage, MembershipMessage};

/// Upstream coins per base currency unit.
pub const COINS_PER_UNIT: f64 = 1000.0;

/// Kind of coin a gift was paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinKind {
    /// Purchasable currency, counts as revenue.
    Gold,
    /// Secondary currency earned for free, never revenue.
    Silver,
}

impl CoinKind {
    /// Anything other than "silver" is treated as purchasable.
    pub fn from_upstream(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("silver") {
            CoinKind::Silver
        } else {
            CoinKind::Gold
        }
    }
}

fn coins_to_value(coins: u64) -> f64 {
    coins as f64 / COINS_PER_UNIT
}

/// Value of a gift event.
///
/// Precedence: non-revenue coin → 0; mystery box → revealed value × count;
/// `total_coin` when non-zero; otherwise unit price × count.
pub fn gift_value(gift: &GiftMessage) -> f64 {
    if CoinKind::from_upstream(&gift.coin_type) == CoinKind::Silver {
        return 0.0;
    }

    let count = u64::from(gift.num);

    if gift.mystery_box {
        let revealed = if gift.r_price > 0 { gift.r_price } else { gift.price };
        return coins_to_value(revealed.saturating_mul(count));
    }

    if gift.total_coin > 0 {
        return coins_to_value(gift.total_coin);
    }

    coins_to_value(gift.price.saturating_mul(count))
}

/// Value of a membership purchase or renewal: unit price per month × months.
pub fn membership_value(membership: &MembershipMessage) -> f64 {
    coins_to_value(membership.price) * f64::from(membership.num)
}

/// Value of a paid message; the upstream price is already in base units.
pub fn paid_message_value(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gift(total_coin: u64, price: u64, num: u32) -> GiftMessage {
        GiftMessage {
            uname: "viewer".to_string(),
            total_coin,
            price,
            num,
            ..Default::default()
        }
    }

    #[test]
    fn gift_uses_total_coin_by_default() {
        assert_eq!(gift_value(&gift(5200, 100, 52)), 5.2);
    }

    #[test]
    fn gift_falls_back_to_unit_price_times_count() {
        assert_eq!(gift_value(&gift(0, 1000, 3)), 3.0);
    }

    #[test]
    fn mystery_box_uses_revealed_price() {
        let mut g = gift(0, 500, 2);
        g.mystery_box = true;
        g.r_price = 300;
        assert!((gift_value(&g) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn mystery_box_ignores_total_coin() {
        let mut g = gift(100_000, 500, 2);
        g.mystery_box = true;
        g.r_price = 300;
        assert!((gift_value(&g) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn mystery_box_without_revealed_price_uses_face_price() {
        let mut g = gift(0, 500, 2);
        g.mystery_box = true;
        assert_eq!(gift_value(&g), 1.0);
    }

    #[test]
    fn silver_gift_is_worth_nothing() {
        let mut g = gift(9000, 100, 90);
        g.coin_type = "silver".to_string();
        assert_eq!(gift_value(&g), 0.0);
    }

    #[test]
    fn membership_multiplies_by_month_count() {
        let m = MembershipMessage {
            username: "carol".to_string(),
            price: 198_000,
            num: 3,
            guard_level: 3,
            ..Default::default()
        };
        assert_eq!(membership_value(&m), 594.0);
    }

    #[test]
    fn paid_message_clamps_invalid_prices() {
        assert_eq!(paid_message_value(30.0), 30.0);
        assert_eq!(paid_message_value(-5.0), 0.0);
        assert_eq!(paid_message_value(f64::NAN), 0.0);
    }

    proptest! {
        #[test]
        fn zero_total_coin_gift_equals_unit_price_times_count(price in 0u64..10_000_000, num in 0u32..10_000) {
            let g = gift(0, price, num);
            let expected = (price * u64::from(num)) as f64 / 1000.0;
            prop_assert!((gift_value(&g) - expected).abs() < 1e-6);
        }

        #[test]
        fn revealed_mystery_box_ignores_total_coin(total in 0u64..10_000_000, price in 0u64..100_000, r_price in 1u64..100_000, num in 0u32..1_000) {
            let mut g = gift(total, price, num);
            g.mystery_box = true;
            g.r_price = r_price;
            let expected = (r_price * u64::from(num)) as f64 / 1000.0;
            prop_assert!((gift_value(&g) - expected).abs() < 1e-6);
        }

        #[test]
        fn silver_gifts_are_never_revenue(total in 0u64..10_000_000, price in 0u64..100_000, num in 0u32..1_000, mystery in any::<bool>()) {
            let mut g = gift(total, price, num);
            g.coin_type = "silver".to_string();
            g.mystery_box = mystery;
            prop_assert_eq!(gift_value(&g), 0.0);
        }

        #[test]
        fn membership_is_unit_price_per_month(price in 0u64..10_000_000, num in 0u32..120) {
            let m = MembershipMessage { price, num, ..Default::default() };
            let expected = price as f64 / 1000.0 * f64::from(num);
            prop_assert!((membership_value(&m) - expected).abs() < 1e-6);
            prop_assert!(membership_value(&m) >= 0.0);
        }
    }
}
