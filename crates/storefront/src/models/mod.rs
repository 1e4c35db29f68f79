//! Domain models for the storefront.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod session;

pub use cart::{Cart, CartLine};
pub use catalog::{Category, Product};
pub use customer::Customer;
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, ShippingAddress};
pub use session::{CurrentCustomer, session_keys};
