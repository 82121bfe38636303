//! GST (Goods and Services Tax) calculation engine for hospital billing
//!
//! Pharmacy goods are sold at MRP with GST already included; services such as
//! consultations and lab tests are priced before GST and have it added on
//! top. Amounts are rounded to paise at each point where they would appear on
//! a printed bill, and those rounding points are part of the contract: a bill
//! total is the sum of its printed lines, never an independently rounded
//! whole-bill figure.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::utils::money::{percent, round_currency, zero};
use crate::utils::validation::{
    validate_non_negative_amount, validate_quantity, validate_tax_rate,
};

/// Standard GST slabs for billable hospital items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GstCategory {
    /// Essential medicines - 5%
    Essential,
    /// General medicines - 12%
    #[default]
    General,
    /// Services (consultation, lab tests) - 18%
    Service,
}

impl GstCategory {
    /// Get the GST rate for this category as a fraction
    pub fn rate(&self) -> BigDecimal {
        match self {
            GstCategory::Essential => percent(5),
            GstCategory::General => percent(12),
            GstCategory::Service => percent(18),
        }
    }

    /// Resolve a free-form item type. Anything unrecognized is billed as a service.
    pub fn from_item_type(item_type: &str) -> Self {
        let normalized = item_type.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "essential" | "essential_medicine" => GstCategory::Essential,
            "general" | "general_medicine" | "medicine" => GstCategory::General,
            _ => GstCategory::Service,
        }
    }
}

/// Standard GST rate for an item type
pub fn standard_gst_rate(item_type: &str) -> BigDecimal {
    GstCategory::from_item_type(item_type).rate()
}

/// Split of a single amount into taxable base and GST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculation {
    /// Taxable portion
    pub base_amount: BigDecimal,
    /// GST portion
    pub tax_amount: BigDecimal,
    /// Amount payable
    pub total: BigDecimal,
    /// Whether the input amount already contained the tax
    pub is_tax_inclusive: bool,
    /// Rate used, as a fraction
    pub tax_rate: BigDecimal,
}

impl TaxCalculation {
    /// Back GST out of a tax-inclusive price (MRP).
    ///
    /// `total` is the MRP itself and is never rounded; base and tax are
    /// rounded independently.
    pub fn inclusive(mrp: BigDecimal, tax_rate: BigDecimal) -> Result<Self, TaxError> {
        validate_non_negative_amount(&mrp, "MRP")?;
        validate_tax_rate(&tax_rate)?;

        if tax_rate == zero() {
            return Ok(Self {
                base_amount: mrp.clone(),
                tax_amount: zero(),
                total: mrp,
                is_tax_inclusive: true,
                tax_rate,
            });
        }

        let base_amount = &mrp / (BigDecimal::from(1) + &tax_rate);
        let tax_amount = &mrp - &base_amount;

        Ok(Self {
            base_amount: round_currency(&base_amount),
            tax_amount: round_currency(&tax_amount),
            total: mrp,
            is_tax_inclusive: true,
            tax_rate,
        })
    }

    /// Add GST on top of a pre-tax price.
    ///
    /// Tax and total are both derived from the unrounded intermediate and
    /// rounded separately, so `total` may be one paisa away from
    /// `base_amount + tax_amount`. The base is passed through unrounded.
    pub fn exclusive(base_price: BigDecimal, tax_rate: BigDecimal) -> Result<Self, TaxError> {
        validate_non_negative_amount(&base_price, "Base price")?;
        validate_tax_rate(&tax_rate)?;

        let tax_amount = &base_price * &tax_rate;
        let total = &base_price + &tax_amount;

        Ok(Self {
            tax_amount: round_currency(&tax_amount),
            total: round_currency(&total),
            base_amount: base_price,
            is_tax_inclusive: false,
            tax_rate,
        })
    }
}

/// Calculate GST contained in a tax-inclusive price
pub fn calculate_inclusive_tax(
    mrp: BigDecimal,
    tax_rate: BigDecimal,
) -> Result<TaxCalculation, TaxError> {
    TaxCalculation::inclusive(mrp, tax_rate)
}

/// Calculate GST added to a tax-exclusive price
pub fn calculate_exclusive_tax(
    base_price: BigDecimal,
    tax_rate: BigDecimal,
) -> Result<TaxCalculation, TaxError> {
    TaxCalculation::exclusive(base_price, tax_rate)
}

/// One line to be billed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillableItem {
    /// Free text shown on the bill
    pub description: String,
    /// Number of units, at least 1
    pub quantity: u32,
    /// MRP per unit when tax-inclusive, pre-tax price per unit otherwise
    pub unit_price: BigDecimal,
    /// GST rate as a fraction in [0, 1]
    pub tax_rate: BigDecimal,
    /// Selects the inclusive or exclusive formula
    pub is_tax_inclusive: bool,
}

impl BillableItem {
    /// Create a new billable item
    pub fn new(
        description: String,
        quantity: u32,
        unit_price: BigDecimal,
        tax_rate: BigDecimal,
        is_tax_inclusive: bool,
    ) -> Self {
        Self {
            description,
            quantity,
            unit_price,
            tax_rate,
            is_tax_inclusive,
        }
    }

    /// Validate quantity, price and rate
    pub fn validate(&self) -> Result<(), TaxError> {
        validate_quantity(self.quantity)?;
        validate_non_negative_amount(&self.unit_price, "Unit price")?;
        validate_tax_rate(&self.tax_rate)
    }
}

/// Computed tax figures for one bill line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineBreakdown {
    pub description: String,
    pub quantity: u32,
    pub unit_price: BigDecimal,
    pub tax_rate: BigDecimal,
    pub is_tax_inclusive: bool,
    /// quantity × unit price, unrounded
    pub amount: BigDecimal,
    /// Taxable portion of the whole line
    pub base_amount: BigDecimal,
    /// Tax portion of the whole line
    pub tax_amount: BigDecimal,
    /// Amount payable for the line
    pub line_total: BigDecimal,
}

impl LineBreakdown {
    /// Compute a line from a billable item.
    ///
    /// The calculator runs on the unit price and the rounded per-unit figures
    /// are scaled by quantity, matching what a pharmacy strip or service
    /// line shows per unit.
    pub fn from_item(item: &BillableItem) -> Result<Self, TaxError> {
        item.validate()?;

        let quantity = BigDecimal::from(item.quantity);
        let amount = &quantity * &item.unit_price;

        let per_unit = if item.is_tax_inclusive {
            TaxCalculation::inclusive(item.unit_price.clone(), item.tax_rate.clone())?
        } else {
            TaxCalculation::exclusive(item.unit_price.clone(), item.tax_rate.clone())?
        };

        let base_amount = round_currency(&(&per_unit.base_amount * &quantity));
        let tax_amount = round_currency(&(&per_unit.tax_amount * &quantity));
        let line_total = if item.is_tax_inclusive {
            round_currency(&amount)
        } else {
            round_currency(&(&base_amount + &tax_amount))
        };

        Ok(Self {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            tax_rate: item.tax_rate.clone(),
            is_tax_inclusive: item.is_tax_inclusive,
            amount,
            base_amount,
            tax_amount,
            line_total,
        })
    }
}

/// Per-line and aggregate tax breakdown of a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillBreakdown {
    /// Lines in input order
    pub items: Vec<LineBreakdown>,
    /// Sum of line base amounts
    pub subtotal: BigDecimal,
    /// Sum of line tax amounts
    pub total_tax: BigDecimal,
    /// Sum of line totals
    pub grand_total: BigDecimal,
}

impl BillBreakdown {
    /// A breakdown with no lines and zero totals
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: zero(),
            total_tax: zero(),
            grand_total: zero(),
        }
    }

    /// Compute the breakdown for a list of items.
    ///
    /// Fails on the first invalid item; nothing is partially computed.
    pub fn generate(items: &[BillableItem]) -> Result<Self, TaxError> {
        let lines = items
            .iter()
            .map(LineBreakdown::from_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_lines(lines))
    }

    /// Aggregate already computed lines
    pub fn from_lines(items: Vec<LineBreakdown>) -> Self {
        let subtotal: BigDecimal = items.iter().map(|line| &line.base_amount).sum();
        let total_tax: BigDecimal = items.iter().map(|line| &line.tax_amount).sum();
        let grand_total: BigDecimal = items.iter().map(|line| &line.line_total).sum();

        Self {
            items,
            subtotal: round_currency(&subtotal),
            total_tax: round_currency(&total_tax),
            grand_total: round_currency(&grand_total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Compute the tax breakdown for a list of billable items
pub fn generate_tax_breakdown(items: &[BillableItem]) -> Result<BillBreakdown, TaxError> {
    BillBreakdown::generate(items)
}

/// CGST/SGST/IGST components of a tax amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstSplit {
    /// Central GST (intra-state)
    pub cgst: BigDecimal,
    /// State GST (intra-state)
    pub sgst: BigDecimal,
    /// Integrated GST (inter-state)
    pub igst: BigDecimal,
}

impl GstSplit {
    /// Split a tax amount into its GST components.
    ///
    /// Intra-state halves are rounded independently, so `cgst + sgst` can be
    /// one paisa off `tax_amount` for odd-paisa amounts. Inter-state passes
    /// the amount through to IGST untouched.
    pub fn split(tax_amount: BigDecimal, is_inter_state: bool) -> Result<Self, TaxError> {
        validate_non_negative_amount(&tax_amount, "Tax amount")?;

        if is_inter_state {
            return Ok(Self {
                cgst: zero(),
                sgst: zero(),
                igst: tax_amount,
            });
        }

        let half = round_currency(&(&tax_amount / BigDecimal::from(2)));
        Ok(Self {
            cgst: half.clone(),
            sgst: half,
            igst: zero(),
        })
    }

    /// Sum of all components
    pub fn total(&self) -> BigDecimal {
        &self.cgst + &self.sgst + &self.igst
    }
}

/// Split a tax amount into CGST+SGST or IGST
pub fn split_gst(tax_amount: BigDecimal, is_inter_state: bool) -> Result<GstSplit, TaxError> {
    GstSplit::split(tax_amount, is_inter_state)
}

/// GST-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaxError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::money::one_paisa;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_inclusive_tax_on_mrp() {
        let calculation = calculate_inclusive_tax(dec("100"), dec("0.12")).unwrap();

        assert_eq!(calculation.base_amount, dec("89.29"));
        assert_eq!(calculation.tax_amount, dec("10.71"));
        assert_eq!(calculation.total, dec("100"));
        assert!(calculation.is_tax_inclusive);
        assert_eq!(calculation.tax_rate, dec("0.12"));
    }

    #[test]
    fn test_inclusive_total_keeps_sub_paisa_mrp() {
        let calculation = calculate_inclusive_tax(dec("10.005"), dec("0.12")).unwrap();

        assert_eq!(calculation.total, dec("10.005"));
        assert_ne!(calculation.total, dec("10.01"));
        assert_eq!(calculation.base_amount, dec("8.93"));
        assert_eq!(calculation.tax_amount, dec("1.07"));
    }

    #[test]
    fn test_exclusive_tax_on_service() {
        let calculation = calculate_exclusive_tax(dec("500"), dec("0.18")).unwrap();

        assert_eq!(calculation.base_amount, dec("500"));
        assert_eq!(calculation.tax_amount, dec("90"));
        assert_eq!(calculation.total, dec("590"));
        assert!(!calculation.is_tax_inclusive);
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let inclusive = calculate_inclusive_tax(dec("250.50"), dec("0")).unwrap();
        assert_eq!(inclusive.base_amount, dec("250.50"));
        assert_eq!(inclusive.tax_amount, dec("0"));
        assert_eq!(inclusive.total, dec("250.50"));

        let exclusive = calculate_exclusive_tax(dec("250.50"), dec("0")).unwrap();
        assert_eq!(exclusive.base_amount, dec("250.50"));
        assert_eq!(exclusive.tax_amount, dec("0"));
        assert_eq!(exclusive.total, dec("250.50"));
    }

    #[test]
    fn test_exclusive_total_rounds_independently_of_tax() {
        // 0.125 * 0.18 = 0.0225 -> 0.02 while 0.1475 -> 0.15
        let calculation = calculate_exclusive_tax(dec("0.125"), dec("0.18")).unwrap();

        assert_eq!(calculation.base_amount, dec("0.125"));
        assert_eq!(calculation.tax_amount, dec("0.02"));
        assert_eq!(calculation.total, dec("0.15"));

        let recombined = &calculation.base_amount + &calculation.tax_amount;
        assert_ne!(recombined, calculation.total);
        assert!((&calculation.total - &recombined).abs() <= one_paisa());
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            calculate_exclusive_tax(dec("-1"), dec("0.1")),
            Err(TaxError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_exclusive_tax(dec("1"), dec("1.5")),
            Err(TaxError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_exclusive_tax(dec("1"), dec("-0.1")),
            Err(TaxError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_inclusive_tax(dec("-0.01"), dec("0.12")),
            Err(TaxError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mixed_bill_breakdown() {
        let items = vec![
            BillableItem::new(
                "Paracetamol 500mg".to_string(),
                15,
                dec("100"),
                dec("0.12"),
                true,
            ),
            BillableItem::new(
                "Doctor Consultation Fee".to_string(),
                1,
                dec("500"),
                dec("0.18"),
                false,
            ),
            BillableItem::new(
                "Complete Blood Count".to_string(),
                1,
                dec("300"),
                dec("0.18"),
                false,
            ),
        ];

        let breakdown = generate_tax_breakdown(&items).unwrap();

        assert_eq!(breakdown.items.len(), 3);
        assert_eq!(breakdown.items[0].amount, dec("1500"));
        assert_eq!(breakdown.items[0].base_amount, dec("1339.35"));
        assert_eq!(breakdown.items[0].tax_amount, dec("160.65"));
        assert_eq!(breakdown.items[0].line_total, dec("1500"));
        assert_eq!(breakdown.items[1].line_total, dec("590"));
        assert_eq!(breakdown.items[2].line_total, dec("354"));

        assert_eq!(breakdown.subtotal, dec("2139.35"));
        assert_eq!(breakdown.total_tax, dec("304.65"));
        assert_eq!(breakdown.grand_total, dec("2444.00"));
    }

    #[test]
    fn test_breakdown_preserves_input_order() {
        let items: Vec<BillableItem> = ["Zinc", "Amoxicillin", "Metformin"]
            .iter()
            .map(|name| BillableItem::new(name.to_string(), 1, dec("10"), dec("0.12"), true))
            .collect();

        let breakdown = generate_tax_breakdown(&items).unwrap();
        let descriptions: Vec<&str> = breakdown
            .items
            .iter()
            .map(|line| line.description.as_str())
            .collect();

        assert_eq!(descriptions, vec!["Zinc", "Amoxicillin", "Metformin"]);
    }

    #[test]
    fn test_empty_breakdown() {
        let breakdown = generate_tax_breakdown(&[]).unwrap();

        assert!(breakdown.is_empty());
        assert_eq!(breakdown, BillBreakdown::empty());
        assert_eq!(breakdown.grand_total, dec("0"));
    }

    #[test]
    fn test_breakdown_rejects_zero_quantity() {
        let items = vec![BillableItem::new(
            "Syringe".to_string(),
            0,
            dec("10"),
            dec("0.12"),
            true,
        )];

        assert!(matches!(
            generate_tax_breakdown(&items),
            Err(TaxError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_split_intra_state() {
        let split = split_gst(dec("90"), false).unwrap();
        assert_eq!(split.cgst, dec("45"));
        assert_eq!(split.sgst, dec("45"));
        assert_eq!(split.igst, dec("0"));
        assert_eq!(split.total(), dec("90"));
    }

    #[test]
    fn test_split_odd_paisa_drifts_by_one_paisa() {
        let split = split_gst(dec("0.05"), false).unwrap();
        assert_eq!(split.cgst, dec("0.03"));
        assert_eq!(split.sgst, dec("0.03"));
        assert_eq!(&split.total() - dec("0.05"), one_paisa());
    }

    #[test]
    fn test_split_inter_state() {
        let split = split_gst(dec("304.65"), true).unwrap();
        assert_eq!(split.cgst, dec("0"));
        assert_eq!(split.sgst, dec("0"));
        assert_eq!(split.igst, dec("304.65"));
    }

    #[test]
    fn test_standard_rates() {
        assert_eq!(standard_gst_rate("essential_medicine"), dec("0.05"));
        assert_eq!(standard_gst_rate("Essential Medicine"), dec("0.05"));
        assert_eq!(standard_gst_rate("general_medicine"), dec("0.12"));
        assert_eq!(standard_gst_rate("consultation"), dec("0.18"));
        assert_eq!(standard_gst_rate("lab_test"), dec("0.18"));
        assert_eq!(standard_gst_rate("something else"), dec("0.18"));
    }
}
