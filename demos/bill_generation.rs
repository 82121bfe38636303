//! Bill generation example: one visit from preview to paid bill

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use hms_billing::utils::MemoryStorage;
use hms_billing::{
    BillAssembler, BillingConfig, BillingError, GstCategory, LabOrder, LabOrderStatus, LabTest,
    Medicine, PaymentMethod, Prescription, PrescriptionItem, Visit,
};
use tracing_subscriber::EnvFilter;

fn sample_visit() -> Visit {
    let mut visit = Visit::new(
        "visit-1001".to_string(),
        "patient-42".to_string(),
        NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(),
    );

    visit.prescriptions.push(Prescription {
        id: "rx-1".to_string(),
        items: vec![
            PrescriptionItem {
                id: "rxi-1".to_string(),
                medicine: Medicine {
                    id: "med-paracetamol".to_string(),
                    name: "Paracetamol".to_string(),
                    strength: "500mg".to_string(),
                    mrp: BigDecimal::from(100),
                    gst_category: GstCategory::General,
                },
                quantity: 15,
                dispensed: true,
            },
            PrescriptionItem {
                id: "rxi-2".to_string(),
                medicine: Medicine {
                    id: "med-insulin".to_string(),
                    name: "Insulin Glargine".to_string(),
                    strength: "100IU/ml".to_string(),
                    mrp: BigDecimal::from(780),
                    gst_category: GstCategory::Essential,
                },
                quantity: 1,
                dispensed: false,
            },
        ],
    });

    visit.lab_orders.push(LabOrder {
        id: "lab-1".to_string(),
        test: LabTest {
            id: "cbc".to_string(),
            name: "Complete Blood Count".to_string(),
            price: BigDecimal::from(300),
        },
        status: LabOrderStatus::Completed,
    });

    visit
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hms_billing=info")),
        )
        .init();

    println!("🏥 HMS Billing - Bill Generation Example\n");

    let config = BillingConfig::load()?;
    println!(
        "⚙️ Prefix {} | consultation ₹{} | inter-state: {}\n",
        config.bill_number_prefix, config.consultation_fee, config.is_inter_state
    );

    let storage = MemoryStorage::new();
    storage.insert_visit(sample_visit())?;
    let assembler = BillAssembler::new(storage, config);

    // 1. Preview
    println!("👀 Preview for visit-1001:");
    let preview = assembler.preview_bill("visit-1001").await?;
    for entry in &preview.lines {
        println!(
            "  [{}] {} × {} = ₹{}",
            entry.item_type.as_str(),
            entry.line.description,
            entry.line.quantity,
            entry.line.line_total
        );
    }
    println!("  Estimated total: ₹{}\n", preview.grand_total);

    // 2. Generate
    println!("🧾 Generating bill...");
    let bill = assembler
        .generate_bill("visit-1001", Some("reception-desk-2".to_string()))
        .await?;
    println!("  Bill Number: {}", bill.bill_number);
    println!("  Subtotal:    ₹{}", bill.subtotal);
    println!("  GST:         ₹{}", bill.tax_amount);
    println!("  Total:       ₹{}", bill.total);

    let split = bill.gst_split(assembler.config().is_inter_state)?;
    println!(
        "  CGST ₹{} | SGST ₹{} | IGST ₹{}\n",
        split.cgst, split.sgst, split.igst
    );

    // 3. Duplicate attempt
    println!("🔁 Generating again for the same visit...");
    match assembler.generate_bill("visit-1001", None).await {
        Err(BillingError::AlreadyExists { bill_number, .. }) => {
            println!("  ❌ Rejected: bill {} already exists\n", bill_number)
        }
        Err(e) => return Err(e.into()),
        Ok(duplicate) => println!("  ⚠️ Unexpected second bill {}\n", duplicate.bill_number),
    }

    // 4. Payments
    println!("💰 Recording payments...");
    assembler
        .record_payment(&bill.id, BigDecimal::from(1000), PaymentMethod::Upi, Some("UPI-88231".to_string()))
        .await?;
    let bill = assembler.get_bill(&bill.id).await?;
    println!("  After UPI:  balance ₹{} ({:?})", bill.balance, bill.status);

    assembler
        .record_payment(&bill.id, bill.balance.clone(), PaymentMethod::Cash, None)
        .await?;
    let bill = assembler.get_bill(&bill.id).await?;
    println!("  After cash: balance ₹{} ({:?})\n", bill.balance, bill.status);

    // 5. Reconcile
    let report = assembler.reconcile_bill(&bill.id).await?;
    println!(
        "🔍 Reconciliation: {} (drift ₹{}, tolerance ₹{})",
        if report.is_valid { "✅ Valid" } else { "❌ Invalid" },
        report.rounding_drift,
        report.drift_tolerance
    );

    println!("\n🎉 Bill generation example completed successfully!");
    Ok(())
}
