//! # HMS Billing
//!
//! Billing core for a hospital management system: turns the billable events
//! of a patient visit into a single GST-compliant bill.
//!
//! ## Features
//!
//! - **GST engine**: tax-inclusive (pharmacy MRP) and tax-exclusive (services)
//!   pricing with paise-exact, per-line rounding
//! - **CGST/SGST/IGST split**: intra-state and inter-state reporting
//! - **Bill assembly**: consultation fee, dispensed medicines and completed lab
//!   tests aggregated per visit, at most one bill per visit
//! - **Bill numbering**: year-scoped `HMS/2024/0001` numbers allocated with
//!   retry on collision
//! - **Payments**: balance and status tracking against a bill
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use hms_billing::{calculate_inclusive_tax, calculate_exclusive_tax};
//! use bigdecimal::BigDecimal;
//!
//! let medicine = calculate_inclusive_tax(BigDecimal::from(100), "0.12".parse().unwrap()).unwrap();
//! assert_eq!(medicine.total, BigDecimal::from(100));
//!
//! let consultation = calculate_exclusive_tax(BigDecimal::from(500), "0.18".parse().unwrap()).unwrap();
//! assert_eq!(consultation.total, BigDecimal::from(590));
//!
//! // For bill generation, implement `BillStorage` and `VisitStorage`
//! // let assembler = BillAssembler::with_stores(bills, visits, BillingConfig::load()?);
//! ```

pub mod billing;
pub mod config;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use billing::*;
pub use self::config::BillingConfig;
pub use tax::gst::*;
pub use traits::*;
pub use types::*;
