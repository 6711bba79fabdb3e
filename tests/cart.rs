use std::str::FromStr;

use storefront_api::domain::cart::{Cart, CartExtra, CartLine, LineKey};
use uuid::Uuid;

fn extra(id: u128, name: &str, price: i64) -> CartExtra {
    CartExtra {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        price,
    }
}

fn line(product: u128, price: i64, quantity: i32, extras: Vec<CartExtra>) -> CartLine {
    CartLine {
        product_id: Uuid::from_u128(product),
        name: format!("product-{product}"),
        price,
        image: None,
        quantity,
        extras,
    }
}

#[test]
fn same_extras_in_any_order_merge_into_one_line() {
    let mut cart = Cart::new();
    cart.add(line(1, 3590, 1, vec![extra(10, "Farofa", 800), extra(11, "Vinagrete", 400)]));
    cart.add(line(1, 3590, 2, vec![extra(11, "Vinagrete", 400), extra(10, "Farofa", 800)]));

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.lines()[0].quantity, 3);
}

#[test]
fn different_extras_make_separate_lines() {
    let mut cart = Cart::new();
    cart.add(line(1, 3590, 1, vec![extra(10, "Farofa", 800)]));
    cart.add(line(1, 3590, 1, vec![extra(11, "Vinagrete", 400)]));
    cart.add(line(1, 3590, 1, vec![]));

    assert_eq!(cart.lines().len(), 3);
    assert_eq!(cart.item_count(), 3);
}

#[test]
fn repeated_extra_is_part_of_the_identity() {
    let mut cart = Cart::new();
    cart.add(line(1, 1000, 1, vec![extra(10, "Farofa", 800)]));
    cart.add(line(1, 1000, 1, vec![extra(10, "Farofa", 800), extra(10, "Farofa", 800)]));

    assert_eq!(cart.lines().len(), 2);
}

#[test]
fn total_counts_extras_per_unit() {
    let mut cart = Cart::new();
    cart.add(line(1, 3590, 2, vec![extra(10, "Farofa Especial", 800)]));

    assert_eq!(cart.total(), 8780);
    assert_eq!(cart.item_count(), 2);
}

#[test]
fn empty_cart_totals_zero() {
    let cart = Cart::new();
    assert!(cart.is_empty());
    assert_eq!(cart.total(), 0);
    assert_eq!(cart.item_count(), 0);
}

#[test]
fn quantity_below_one_removes_the_line() {
    let mut cart = Cart::new();
    let key = cart.add(line(1, 1000, 1, vec![]));
    cart.add(line(2, 500, 1, vec![]));

    assert!(cart.update_quantity(&key, 0));
    assert_eq!(cart.lines().len(), 1);
    assert!(cart.get(&key).is_none());
    assert!(cart.lines().iter().all(|l| l.quantity >= 1));
}

#[test]
fn update_quantity_sets_value_and_reports_missing_lines() {
    let mut cart = Cart::new();
    let key = cart.add(line(1, 1000, 1, vec![]));

    assert!(cart.update_quantity(&key, 5));
    assert_eq!(cart.get(&key).map(|l| l.quantity), Some(5));

    let missing = LineKey::new(Uuid::from_u128(99), []);
    assert!(!cart.update_quantity(&missing, 2));
    assert!(!cart.remove(&missing));
}

#[test]
fn add_treats_non_positive_quantity_as_one() {
    let mut cart = Cart::new();
    cart.add(line(1, 1000, 0, vec![]));
    assert_eq!(cart.item_count(), 1);
}

#[test]
fn clear_empties_the_cart() {
    let mut cart = Cart::new();
    cart.add(line(1, 1000, 2, vec![]));
    cart.clear();
    assert!(cart.is_empty());
}

#[test]
fn line_key_text_form_parses_back_with_sorted_extras() -> anyhow::Result<()> {
    let product = Uuid::from_u128(1);
    let (a, b) = (Uuid::from_u128(10), Uuid::from_u128(11));

    let key = LineKey::new(product, [b, a]);
    assert_eq!(key.to_string(), format!("{product}:{a},{b}"));

    let parsed = LineKey::from_str(&format!("{product}:{b},{a}"))?;
    assert_eq!(parsed, key);

    let plain = LineKey::from_str(&product.to_string())?;
    assert_eq!(plain, LineKey::new(product, []));
    Ok(())
}

#[test]
fn malformed_line_key_is_rejected() {
    assert!(LineKey::from_str("not-a-uuid").is_err());
    assert!(LineKey::from_str(&format!("{}:oops", Uuid::from_u128(1))).is_err());
}

#[test]
fn stored_document_restores_and_merges() -> anyhow::Result<()> {
    let mut cart = Cart::new();
    cart.add(line(1, 3590, 1, vec![extra(10, "Farofa", 800)]));
    let document = cart.to_document()?;

    let restored = Cart::restore(document);
    assert_eq!(restored, cart);

    let duplicated = serde_json::json!([
        { "product_id": Uuid::from_u128(1), "name": "a", "price": 100, "quantity": 1 },
        { "product_id": Uuid::from_u128(1), "name": "a", "price": 100, "quantity": 2 },
        { "product_id": Uuid::from_u128(2), "name": "b", "price": 100, "quantity": 0 }
    ]);
    let merged = Cart::restore(duplicated);
    assert_eq!(merged.lines().len(), 1);
    assert_eq!(merged.item_count(), 3);
    Ok(())
}

#[test]
fn unreadable_document_becomes_empty_cart() {
    let cart = Cart::restore(serde_json::json!({ "not": "a list" }));
    assert!(cart.is_empty());
}
