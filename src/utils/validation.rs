//! Validation utilities

use bigdecimal::BigDecimal;

use crate::tax::gst::TaxError;
use crate::types::*;
use crate::utils::money::zero;

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal, field: &str) -> Result<(), TaxError> {
    if *amount < zero() {
        return Err(TaxError::InvalidInput(format!(
            "{} cannot be negative: {}",
            field, amount
        )));
    }
    Ok(())
}

/// Validate that a tax rate is a fraction in [0, 1]
pub fn validate_tax_rate(tax_rate: &BigDecimal) -> Result<(), TaxError> {
    if *tax_rate < zero() || *tax_rate > BigDecimal::from(1) {
        return Err(TaxError::InvalidInput(format!(
            "Tax rate must be between 0 and 1, got {}",
            tax_rate
        )));
    }
    Ok(())
}

/// Validate that a billed quantity is at least one
pub fn validate_quantity(quantity: u32) -> Result<(), TaxError> {
    if quantity == 0 {
        return Err(TaxError::InvalidInput(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Validate a visit, bill or payment identifier
pub fn validate_id(id: &str, kind: &str) -> BillingResult<()> {
    if id.trim().is_empty() {
        return Err(BillingError::InvalidInput(format!(
            "{} ID cannot be empty",
            kind
        )));
    }

    if id.len() > 64 {
        return Err(BillingError::InvalidInput(format!(
            "{} ID cannot exceed 64 characters",
            kind
        )));
    }

    Ok(())
}

/// Validate a payment against the outstanding balance of a bill
pub fn validate_payment_amount(amount: &BigDecimal, balance: &BigDecimal) -> BillingResult<()> {
    if *amount <= zero() {
        return Err(BillingError::InvalidInput(
            "Payment amount must be positive".to_string(),
        ));
    }

    if amount > balance {
        return Err(BillingError::InvalidInput(format!(
            "Payment amount exceeds balance: {} > {}",
            amount, balance
        )));
    }

    Ok(())
}
