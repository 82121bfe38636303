//! GST calculation examples

use bigdecimal::BigDecimal;
use hms_billing::{
    calculate_exclusive_tax, calculate_inclusive_tax, generate_tax_breakdown, split_gst,
    standard_gst_rate, BillableItem, GstCategory,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 HMS Billing - GST Calculation Examples\n");

    // 1. Standard slabs
    println!("📊 Standard GST Rates by Category:");
    let categories = [
        (GstCategory::Essential, "Essential medicines"),
        (GstCategory::General, "General medicines"),
        (GstCategory::Service, "Consultations and lab tests"),
    ];

    for (category, description) in categories.iter() {
        println!("  {:?}: {} - {}", category, category.rate(), description);
    }
    for item_type in ["essential_medicine", "medicine", "lab-test"] {
        println!("  standard_gst_rate({:?}) = {}", item_type, standard_gst_rate(item_type));
    }
    println!();

    // 2. Medicine sold at MRP, GST backed out
    println!("💊 Tax-inclusive (MRP ₹100 at 12%):");
    let medicine = calculate_inclusive_tax(BigDecimal::from(100), GstCategory::General.rate())?;
    println!("  Base Amount: ₹{}", medicine.base_amount);
    println!("  GST:         ₹{}", medicine.tax_amount);
    println!("  MRP:         ₹{}", medicine.total);
    println!();

    // 3. Service priced before GST
    println!("🩺 Tax-exclusive (consultation ₹500 at 18%):");
    let consultation = calculate_exclusive_tax(BigDecimal::from(500), GstCategory::Service.rate())?;
    println!("  Base Amount: ₹{}", consultation.base_amount);
    println!("  GST:         ₹{}", consultation.tax_amount);
    println!("  Total:       ₹{}", consultation.total);
    println!();

    // 4. Mixed bill
    println!("🧾 Multi-line Bill Breakdown:");
    let items = vec![
        BillableItem::new(
            "Doctor Consultation Fee".to_string(),
            1,
            BigDecimal::from(500),
            GstCategory::Service.rate(),
            false,
        ),
        BillableItem::new(
            "Paracetamol 500mg".to_string(),
            15,
            BigDecimal::from(100),
            GstCategory::General.rate(),
            true,
        ),
        BillableItem::new(
            "Complete Blood Count".to_string(),
            1,
            BigDecimal::from(300),
            GstCategory::Service.rate(),
            false,
        ),
    ];

    let breakdown = generate_tax_breakdown(&items)?;
    for (i, line) in breakdown.items.iter().enumerate() {
        println!(
            "    {}. {} × {} @ ₹{} = ₹{} (base ₹{}, GST ₹{})",
            i + 1,
            line.description,
            line.quantity,
            line.unit_price,
            line.line_total,
            line.base_amount,
            line.tax_amount
        );
    }
    println!();
    println!("  Subtotal:    ₹{}", breakdown.subtotal);
    println!("  Total GST:   ₹{}", breakdown.total_tax);
    println!("  Grand Total: ₹{}", breakdown.grand_total);
    println!();

    // 5. CGST/SGST vs IGST
    println!("🏢 Intra-state Split (CGST + SGST):");
    let intra = split_gst(breakdown.total_tax.clone(), false)?;
    println!("  CGST: ₹{}", intra.cgst);
    println!("  SGST: ₹{}", intra.sgst);
    println!();

    println!("🌍 Inter-state Split (IGST only):");
    let inter = split_gst(breakdown.total_tax.clone(), true)?;
    println!("  IGST: ₹{}", inter.igst);
    println!();

    // 6. Validation
    println!("✅ Input Validation:");
    match calculate_inclusive_tax(BigDecimal::from(-10), GstCategory::General.rate()) {
        Ok(_) => println!("  ✓ Accepted negative MRP"),
        Err(e) => println!("  ❌ {}", e),
    }
    match calculate_exclusive_tax(BigDecimal::from(100), BigDecimal::from(18)) {
        Ok(_) => println!("  ✓ Accepted rate of 18 (not a fraction)"),
        Err(e) => println!("  ❌ {}", e),
    }

    println!("\n🎉 GST calculation examples completed successfully!");
    Ok(())
}
