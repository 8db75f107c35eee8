//! SQLite storage implementation for fee plans, challans and payments.

mod challan_repository;
mod model;
mod payment_repository;
mod plan_repository;

pub use challan_repository::FeeChallanRepository;
pub use model::{FeeChallanDB, FeePaymentDB, FeePlanDB};
pub use payment_repository::FeePaymentRepository;
pub use plan_repository::FeePlanRepository;
