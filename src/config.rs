//! Billing configuration

use bigdecimal::BigDecimal;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::types::*;
use crate::utils::money::zero;

/// Settings for bill assembly
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillingConfig {
    /// Leading segment of bill numbers, e.g. `HMS` in `HMS/2024/0001`
    #[serde(default = "default_bill_number_prefix")]
    pub bill_number_prefix: String,
    /// Consultation fee before GST
    #[serde(default = "default_consultation_fee")]
    pub consultation_fee: BigDecimal,
    /// Report GST as IGST instead of CGST + SGST
    #[serde(default)]
    pub is_inter_state: bool,
    /// Attempts at allocating a bill number before giving up with a conflict
    #[serde(default = "default_max_numbering_attempts")]
    pub max_numbering_attempts: u32,
}

fn default_bill_number_prefix() -> String {
    "HMS".to_string()
}

fn default_consultation_fee() -> BigDecimal {
    BigDecimal::from(500)
}

fn default_max_numbering_attempts() -> u32 {
    5
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            bill_number_prefix: default_bill_number_prefix(),
            consultation_fee: default_consultation_fee(),
            is_inter_state: false,
            max_numbering_attempts: default_max_numbering_attempts(),
        }
    }
}

impl BillingConfig {
    /// Load from an optional `billing` config file and `HMS_BILLING__*`
    /// environment variables, e.g. `HMS_BILLING__CONSULTATION_FEE=650`.
    pub fn load() -> BillingResult<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("billing").required(false))
            .add_source(Environment::with_prefix("HMS_BILLING").separator("__"))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate the settings
    pub fn validate(&self) -> BillingResult<()> {
        let prefix = self.bill_number_prefix.trim();
        if prefix.is_empty() {
            return Err(BillingError::InvalidInput(
                "Bill number prefix cannot be empty".to_string(),
            ));
        }

        if prefix.contains('/') {
            return Err(BillingError::InvalidInput(format!(
                "Bill number prefix cannot contain '/': {}",
                prefix
            )));
        }

        if self.consultation_fee < zero() {
            return Err(BillingError::InvalidInput(format!(
                "Consultation fee cannot be negative: {}",
                self.consultation_fee
            )));
        }

        if self.max_numbering_attempts == 0 {
            return Err(BillingError::InvalidInput(
                "Bill numbering needs at least one attempt".to_string(),
            ));
        }

        Ok(())
    }
}
