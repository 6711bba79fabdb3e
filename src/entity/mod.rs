pub mod carts;
pub mod coupon_uses;
pub mod coupons;
pub mod delivery_zones;
pub mod loyalty_points;
pub mod order_items;
pub mod orders;
pub mod product_extras;
pub mod product_reviews;
pub mod products;
pub mod profiles;
pub mod user_roles;
pub mod users;

pub use carts::Entity as Carts;
pub use coupon_uses::Entity as CouponUses;
pub use coupons::Entity as Coupons;
pub use delivery_zones::Entity as DeliveryZones;
pub use loyalty_points::Entity as LoyaltyPoints;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_extras::Entity as ProductExtras;
pub use product_reviews::Entity as ProductReviews;
pub use products::Entity as Products;
pub use profiles::Entity as Profiles;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
