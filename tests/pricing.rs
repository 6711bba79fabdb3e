use chrono::{Duration, TimeZone, Utc};
use storefront_api::domain::{
    checkout::{AddressParts, CheckoutError, PaymentMethod, change_amount, require},
    coupon::{
        CouponError, CouponTerms, DiscountType, MAX_ORDER_AMOUNT, normalize_code,
        validate_discount, validate_order_amount,
    },
    loyalty::{points_for_total, reward_credits},
    money::Money,
    pricing::{Quote, order_amount},
};
use storefront_api::dto::coupons::UpdateCouponRequest;

fn terms(discount_type: DiscountType, value: i64) -> CouponTerms {
    CouponTerms {
        discount_type,
        discount_value: value,
        min_order_value: None,
        max_uses: None,
        current_uses: 0,
        expires_at: None,
        is_active: true,
    }
}

#[test]
fn percentage_discount_rounds_down() {
    let coupon = terms(DiscountType::Percentage, 10);
    assert_eq!(coupon.discount_for(5000), 500);
    assert_eq!(coupon.discount_for(3599), 359);
}

#[test]
fn fixed_discount_never_exceeds_the_order() {
    let coupon = terms(DiscountType::Fixed, 2000);
    assert_eq!(coupon.discount_for(5000), 2000);
    assert_eq!(coupon.discount_for(1500), 1500);
}

#[test]
fn minimum_order_value_is_reported_in_currency_units() {
    let now = Utc::now();
    let coupon = CouponTerms {
        min_order_value: Some(3000),
        ..terms(DiscountType::Percentage, 10)
    };

    let err = coupon.apply(2999, now).unwrap_err();
    assert_eq!(err, CouponError::BelowMinimum(Money(3000)));
    assert_eq!(err.to_string(), "Minimum order value: 30.00");

    assert_eq!(coupon.apply(3000, now), Ok(300));
}

#[test]
fn expired_coupon_is_rejected() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let coupon = CouponTerms {
        expires_at: Some(now - Duration::seconds(1)),
        ..terms(DiscountType::Fixed, 500)
    };
    assert_eq!(coupon.apply(5000, now), Err(CouponError::Expired));

    let still_valid = CouponTerms {
        expires_at: Some(now + Duration::days(1)),
        ..terms(DiscountType::Fixed, 500)
    };
    assert_eq!(still_valid.apply(5000, now), Ok(500));
}

#[test]
fn exhausted_coupon_is_rejected() {
    let coupon = CouponTerms {
        max_uses: Some(3),
        current_uses: 3,
        ..terms(DiscountType::Fixed, 500)
    };
    assert_eq!(
        coupon.apply(5000, Utc::now()),
        Err(CouponError::UsageLimitReached)
    );
}

#[test]
fn inactive_coupon_looks_like_a_missing_one() {
    let coupon = CouponTerms {
        is_active: false,
        ..terms(DiscountType::Fixed, 500)
    };
    let err = coupon.apply(5000, Utc::now()).unwrap_err();
    assert_eq!(err.to_string(), "Coupon not found");
}

#[test]
fn admin_discount_values_are_bounded() {
    assert!(validate_discount(DiscountType::Percentage, 100).is_ok());
    assert!(validate_discount(DiscountType::Percentage, 101).is_err());
    assert!(validate_discount(DiscountType::Percentage, 0).is_err());
    assert!(validate_discount(DiscountType::Fixed, 1).is_ok());
    assert!(validate_discount(DiscountType::Fixed, 0).is_err());
}

#[test]
fn coupon_codes_are_trimmed_and_uppercased() {
    assert_eq!(normalize_code("  bemvindo10 "), "BEMVINDO10");
    assert!("weekly".parse::<DiscountType>().is_err());
    assert_eq!("fixed".parse::<DiscountType>(), Ok(DiscountType::Fixed));
}

#[test]
fn quote_adds_delivery_and_subtracts_discount() {
    let quote = Quote::new(8780, 500, 928);
    assert_eq!(quote.total, 8780 + 500 - 928);
    assert_eq!(order_amount(8780, 500), 9280);
}

#[test]
fn quote_total_never_goes_negative() {
    let quote = Quote::new(1000, 0, 5000);
    assert_eq!(quote.discount, 1000);
    assert_eq!(quote.total, 0);
}

#[test]
fn money_formats_two_decimals() {
    assert_eq!(Money(3590).to_string(), "35.90");
    assert_eq!(Money(5).to_string(), "0.05");
    assert_eq!(Money(-250).to_string(), "-2.50");
}

#[test]
fn loyalty_earns_a_point_per_whole_unit() {
    assert_eq!(points_for_total(8780), 87);
    assert_eq!(points_for_total(99), 0);
    assert_eq!(reward_credits(250), 2);
}

#[test]
fn change_is_only_kept_for_cash_payments() {
    assert_eq!(change_amount(PaymentMethod::Pix, true, Some(5000)), Ok(0));
    assert_eq!(change_amount(PaymentMethod::Money, false, Some(5000)), Ok(0));
    assert_eq!(change_amount(PaymentMethod::Money, true, Some(5000)), Ok(5000));
    assert_eq!(
        change_amount(PaymentMethod::Money, true, None),
        Err(CheckoutError::InvalidChangeAmount)
    );
    assert_eq!(
        change_amount(PaymentMethod::Money, true, Some(0)),
        Err(CheckoutError::InvalidChangeAmount)
    );
}

#[test]
fn address_is_validated_and_flattened() {
    let mut address = AddressParts {
        street: "Rua das Flores".into(),
        number: "123".into(),
        complement: Some("Apto 4".into()),
        neighborhood: "Centro".into(),
        city: "Sao Paulo".into(),
        zip_code: "01000-000".into(),
    };
    assert!(address.validate().is_ok());
    assert_eq!(
        address.format(),
        "Rua das Flores, 123, Apto 4, Centro, Sao Paulo, ZIP: 01000-000"
    );

    address.complement = Some("  ".into());
    assert_eq!(
        address.format(),
        "Rua das Flores, 123, Centro, Sao Paulo, ZIP: 01000-000"
    );

    address.number = " ".into();
    assert_eq!(address.validate(), Err(CheckoutError::MissingField("number")));
}

#[test]
fn blank_required_fields_are_reported_by_name() {
    let err = require("customer_phone", "   ").unwrap_err();
    assert_eq!(err.to_string(), "customer_phone is required");
    assert!(require("customer_name", "Ana").is_ok());
}

#[test]
fn percentage_discount_on_huge_amounts_does_not_overflow() {
    let coupon = terms(DiscountType::Percentage, 10);
    let amount = i64::MAX / 2;
    let discount = coupon
        .apply(amount, Utc::now())
        .expect("coupon applies");
    assert_eq!(discount, amount / 10);

    let everything = terms(DiscountType::Percentage, 100);
    assert_eq!(everything.discount_for(i64::MAX), i64::MAX);
}

#[test]
fn client_order_amounts_are_bounded() {
    assert!(validate_order_amount(0).is_ok());
    assert!(validate_order_amount(MAX_ORDER_AMOUNT).is_ok());
    assert_eq!(
        validate_order_amount(-1),
        Err(CouponError::InvalidOrderAmount)
    );
    assert_eq!(
        validate_order_amount(MAX_ORDER_AMOUNT + 1),
        Err(CouponError::InvalidOrderAmount)
    );
}

#[test]
fn coupon_update_distinguishes_null_from_absent() -> anyhow::Result<()> {
    let cleared: UpdateCouponRequest =
        serde_json::from_str(r#"{"max_uses": null, "expires_at": null}"#)?;
    assert_eq!(cleared.max_uses, Some(None));
    assert_eq!(cleared.expires_at, Some(None));
    assert_eq!(cleared.min_order_value, None);

    let set: UpdateCouponRequest = serde_json::from_str(r#"{"min_order_value": 2500}"#)?;
    assert_eq!(set.min_order_value, Some(Some(2500)));
    assert_eq!(set.max_uses, None);
    Ok(())
}
