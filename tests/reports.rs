use chrono::{NaiveDate, TimeZone, Utc};
use storefront_api::{
    domain::{
        contact::whatsapp_link,
        reports::{self, ItemFact, OrderFact},
    },
    models::Order,
    services::admin_service::orders_to_csv,
};
use uuid::Uuid;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
}

fn fact(name: &str, phone: &str, total: i64, status: &str, date: NaiveDate) -> OrderFact {
    OrderFact {
        customer_name: name.to_string(),
        customer_email: None,
        customer_phone: phone.to_string(),
        customer_address: None,
        total_amount: total,
        status: status.to_string(),
        order_date: date,
    }
}

fn item(name: &str, quantity: i32) -> ItemFact {
    ItemFact {
        product_name: name.to_string(),
        quantity,
    }
}

#[test]
fn daily_sales_only_count_delivered_orders() {
    let orders = vec![
        fact("Ana", "1", 5000, "delivered", day(2)),
        fact("Ana", "1", 3000, "delivered", day(1)),
        fact("Bia", "2", 7000, "delivered", day(2)),
        fact("Caio", "3", 9900, "cancelled", day(2)),
        fact("Caio", "3", 4200, "received", day(3)),
    ];

    let sales = reports::daily_sales(&orders);
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].date, day(1));
    assert_eq!((sales[0].revenue, sales[0].orders), (3000, 1));
    assert_eq!((sales[1].revenue, sales[1].orders), (12000, 2));
}

#[test]
fn overview_averages_completed_orders() {
    let orders = vec![
        fact("Ana", "1", 5000, "delivered", day(1)),
        fact("Bia", "2", 2000, "delivered", day(1)),
        fact("Caio", "3", 9900, "preparing", day(1)),
    ];

    let overview = reports::overview(&orders);
    assert_eq!(overview.total_revenue, 7000);
    assert_eq!(overview.total_orders, 3);
    assert_eq!(overview.completed_orders, 2);
    assert_eq!(overview.average_order_value, 3500);

    assert_eq!(reports::overview(&[]).average_order_value, 0);
}

#[test]
fn top_products_rank_by_quantity_then_name() {
    let items = vec![
        item("Suco Natural", 2),
        item("Frango Caipira", 1),
        item("Batata Portuguesa", 3),
        item("Frango Caipira", 2),
        item("Agua Mineral", 1),
    ];

    let top = reports::top_products(&items, 3);
    let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Batata Portuguesa", "Frango Caipira", "Suco Natural"]);
    assert_eq!(top[1].quantity, 3);
    assert_eq!(top[1].orders, 2);
}

#[test]
fn customers_group_by_name_and_phone() {
    let mut first = fact("Ana", "1199", 5000, "delivered", day(1));
    first.customer_email = Some("ana@example.com".into());
    let orders = vec![
        first,
        fact("Ana", "1199", 2500, "cancelled", day(4)),
        fact("Ana", "2288", 100, "delivered", day(2)),
        fact("Bia", "3377", 9000, "received", day(3)),
    ];

    let list = reports::customers(&orders);
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].name, "Bia");

    let ana = &list[1];
    assert_eq!(ana.phone, "1199");
    assert_eq!(ana.total_orders, 2);
    assert_eq!(ana.total_spent, 7500);
    assert_eq!(ana.delivered_orders, 1);
    assert_eq!(ana.last_order, day(4));
    assert_eq!(ana.email.as_deref(), Some("ana@example.com"));

    let found = reports::search_customers(list.clone(), "ANA@EXAMPLE");
    assert_eq!(found.len(), 1);
    assert_eq!(reports::search_customers(list.clone(), "3377")[0].name, "Bia");
    assert_eq!(reports::search_customers(list, "  ").len(), 3);
}

#[test]
fn whatsapp_link_keeps_digits_and_encodes_the_message() {
    let link = whatsapp_link("+55 (11) 99999-0000", "Olá mundo & cia");
    assert_eq!(
        link,
        "https://wa.me/5511999990000?text=Ol%C3%A1%20mundo%20%26%20cia"
    );
}

#[test]
fn csv_export_has_header_and_currency_columns() -> anyhow::Result<()> {
    let created_at = Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap();
    let order = Order {
        id: Uuid::from_u128(7),
        user_id: None,
        customer_name: "Silva, Ana".into(),
        customer_email: None,
        customer_phone: "11999990000".into(),
        customer_address: Some("Rua A, 1, Centro, Sao Paulo, ZIP: 01000-000".into()),
        subtotal_amount: 8780,
        delivery_fee: 500,
        discount_amount: 928,
        total_amount: 8352,
        coupon_code: Some("BEMVINDO10".into()),
        payment_method: "money".into(),
        delivery_type: "delivery".into(),
        delivery_zone_id: None,
        estimated_time: 30,
        needs_change: true,
        change_amount: 10000,
        notes: None,
        status: "received".into(),
        order_date: created_at.date_naive(),
        created_at,
        updated_at: created_at,
    };

    let csv = orders_to_csv(&[order])?;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(
            "id,created_at,status,customer_name,customer_phone,customer_email,customer_address,\
             delivery_type,payment_method,subtotal,delivery_fee,discount,total,coupon_code,\
             needs_change,change_amount"
        )
    );
    let row = lines.next().unwrap_or_default();
    assert!(row.contains("\"Silva, Ana\""));
    assert!(row.contains("87.80,5.00,9.28,83.52,BEMVINDO10,true,100.00"));
    assert!(lines.next().is_none());

    assert_eq!(orders_to_csv(&[])?.lines().count(), 1);
    Ok(())
}
