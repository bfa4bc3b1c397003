//! The `costgrade invoices` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use costgrade_core::feedback::CURRENCY;
use costgrade_core::model::CostField;
use costgrade_core::traits::AnswerStore;

use super::{require_student, Context};

pub fn execute(ctx: &Context, raw_id: &str, with_answers: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let student = require_student(&store, raw_id)?;
    let invoices = store.invoices_for(&student.student_id)?;

    if invoices.is_empty() {
        println!("No invoices found for {}.", student.student_id);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Invoice", "Product", "Quantity", "From", "To", "Route", "Value (USD)",
    ]);
    for inv in &invoices {
        table.add_row(vec![
            Cell::new(format!("#{}", inv.invoice_number)),
            Cell::new(&inv.product_name),
            Cell::new(inv.quantity),
            Cell::new(&inv.origin_country),
            Cell::new(&inv.destination_country),
            Cell::new(&inv.route_name),
            Cell::new(format!("{:.2}", inv.total_value)),
        ]);
    }
    println!("Invoices for {} ({})", student.name, student.student_id);
    println!("{table}");

    if with_answers {
        let mut answers = Table::new();
        let mut header = vec!["Invoice".to_string()];
        header.extend(
            CostField::PRESENTATION_ORDER
                .iter()
                .map(|f| format!("{} ({CURRENCY})", f.label())),
        );
        answers.set_header(header);

        for inv in &invoices {
            let mut row = vec![Cell::new(format!("#{}", inv.invoice_number))];
            match store.answer_key(&student.student_id, inv.invoice_number)? {
                Some(key) => row.extend(
                    CostField::PRESENTATION_ORDER
                        .iter()
                        .map(|f| Cell::new(format!("{:.2}", key.get(*f)))),
                ),
                None => row.push(Cell::new("no answer key")),
            }
            answers.add_row(row);
        }
        println!("\nReference answers");
        println!("{answers}");
    }

    Ok(())
}
