//! Shared newtype wrappers and enums.

pub mod email;
pub mod id;
pub mod money;
pub mod payment;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use payment::{
    PAYMENT_METHODS_SETTING, PaymentMethod, PaymentMethodKind, PaymentMethodOverride,
    default_payment_methods, merge_payment_methods,
};
pub use status::{AdminRole, OrderStatus};
