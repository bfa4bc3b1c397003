//! The `costgrade init` command.

use std::path::Path;

use anyhow::Result;

use costgrade_store::SqliteStore;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;

    // Create costgrade.toml
    if Path::new("costgrade.toml").exists() {
        println!("costgrade.toml already exists, skipping.");
    } else {
        let content = format!(
            "# costgrade configuration\n\ndatabase = {:?}\nbusy_timeout_ms = {}\n",
            config.database.display().to_string(),
            config.busy_timeout_ms
        );
        std::fs::write("costgrade.toml", content)?;
        println!("Created costgrade.toml");
    }

    // Create example roster
    let roster_path = Path::new("roster.example.toml");
    if roster_path.exists() {
        println!("roster.example.toml already exists, skipping.");
    } else {
        std::fs::write(roster_path, EXAMPLE_ROSTER)?;
        println!("Created roster.example.toml");
    }

    // Create database schema
    let existed = config.database.exists();
    SqliteStore::create(&config.database)?;
    if existed {
        println!("Database {} already exists, schema checked.", config.database.display());
    } else {
        println!("Created database {}", config.database.display());
    }

    println!("\nNext steps:");
    println!("  1. Edit roster.example.toml with your class");
    println!("  2. Run: costgrade validate --roster roster.example.toml");
    println!("  3. Run: costgrade seed --roster roster.example.toml");
    println!("  4. Run: costgrade submit 1212603034 --invoice 1 --logistics-cost 500 ...");

    Ok(())
}

const EXAMPLE_ROSTER: &str = r#"# costgrade roster: students, invoices and answer keys

[[students]]
student_id = "1212603034"
name = "Ayşe Yılmaz"
registration_date = "2025-09-15T10:30:00"

[[students.invoices]]
invoice_number = 1
product_name = "Olive oil"
origin_country = "Turkey"
destination_country = "Germany"
route_name = "Istanbul - Hamburg"
quantity = 100
unit_price = 12.5
total_value = 1250.0

[students.invoices.answers]
customs_duty = 120.0
excise_tax = 80.0
vat = 150.0
logistics_cost = 500.0
shipping_cost = 300.0
total_cost = 1150.0

[[students.invoices]]
invoice_number = 2
product_name = "Hazelnuts"
origin_country = "Turkey"
destination_country = "Italy"
route_name = "Mersin - Genoa"
quantity = 40
unit_price = 8.0
total_value = 320.0

[students.invoices.answers]
customs_duty = 20.0
excise_tax = 0.0
vat = 64.0
logistics_cost = 90.0
shipping_cost = 60.0
total_cost = 494.0
"#;
