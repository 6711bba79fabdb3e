use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        cart::{CartExtra, CartLine},
        checkout::{AddressParts, DeliveryType, PaymentMethod},
        coupon::DiscountType,
        order_status::OrderStatus,
        pricing::Quote,
        reports::{CustomerSummary, DailySales, Overview, ProductSales},
    },
    dto::{
        admin, auth as auth_dto, cart as cart_dto, contact as contact_dto, coupons,
        loyalty as loyalty_dto, orders as order_dto, products, profile as profile_dto, reviews,
        zones as zone_dto,
    },
    events::{OrderEvent, OrderEventKind},
    models::{
        Coupon, DeliveryZone, Order, OrderItem, Product, ProductExtra, ProductWithExtras, Profile,
        Review, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin as admin_routes, auth, cart, contact, coupons as coupon_routes, health, loyalty,
        orders, params, products as product_routes, profile, zones,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::current_user,
        product_routes::list_products,
        product_routes::list_categories,
        product_routes::get_product,
        product_routes::list_reviews,
        product_routes::upsert_review,
        product_routes::get_rating,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        orders::checkout,
        orders::order_history,
        orders::get_order,
        coupon_routes::validate_coupon,
        zones::list_zones,
        loyalty::get_balance,
        profile::get_profile,
        profile::update_profile,
        contact::whatsapp,
        admin_routes::setup_first_admin,
        admin_routes::dashboard,
        admin_routes::list_all_orders,
        admin_routes::active_orders,
        admin_routes::order_stream,
        admin_routes::export_orders,
        admin_routes::get_order_admin,
        admin_routes::update_order_status,
        admin_routes::list_customers,
        admin_routes::sales_report,
        admin_routes::list_products,
        admin_routes::create_product,
        admin_routes::update_product,
        admin_routes::set_availability,
        admin_routes::delete_product,
        admin_routes::list_coupons,
        admin_routes::create_coupon,
        admin_routes::update_coupon,
        admin_routes::delete_coupon,
        admin_routes::list_zones,
        admin_routes::create_zone,
        admin_routes::update_zone
    ),
    components(
        schemas(
            User,
            Profile,
            Product,
            ProductExtra,
            ProductWithExtras,
            DeliveryZone,
            Coupon,
            Order,
            OrderItem,
            Review,
            CartExtra,
            CartLine,
            AddressParts,
            DeliveryType,
            PaymentMethod,
            DiscountType,
            OrderStatus,
            Quote,
            DailySales,
            ProductSales,
            Overview,
            CustomerSummary,
            OrderEvent,
            OrderEventKind,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            auth_dto::MeResponse,
            cart_dto::AddToCartRequest,
            cart_dto::UpdateCartItemRequest,
            cart_dto::CartView,
            cart_dto::CartLineView,
            order_dto::CheckoutLine,
            order_dto::CustomerInfo,
            order_dto::CheckoutRequest,
            order_dto::CheckoutResponse,
            order_dto::OrderWithItems,
            order_dto::OrderList,
            order_dto::OrderHistory,
            coupons::ValidateCouponRequest,
            coupons::CouponQuote,
            coupons::CreateCouponRequest,
            coupons::UpdateCouponRequest,
            coupons::CouponList,
            zone_dto::CreateZoneRequest,
            zone_dto::UpdateZoneRequest,
            zone_dto::ZoneList,
            products::ExtraInput,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::AvailabilityRequest,
            products::ProductList,
            products::ProductDetail,
            products::CategoryCount,
            reviews::CreateReviewRequest,
            reviews::ProductRating,
            reviews::ReviewList,
            loyalty_dto::LoyaltyBalance,
            profile_dto::UpdateProfileRequest,
            contact_dto::ContactLink,
            admin::UpdateOrderStatusRequest,
            admin::DashboardStats,
            admin::CustomerList,
            admin::SalesReport,
            admin::SetupResponse,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ApiResponse<Product>,
            ApiResponse<order_dto::OrderWithItems>,
            ApiResponse<order_dto::OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Coupons", description = "Coupon validation"),
        (name = "Delivery zones", description = "Delivery zone endpoints"),
        (name = "Loyalty", description = "Loyalty points"),
        (name = "Profile", description = "Customer profile"),
        (name = "Contact", description = "Contact links"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
