use std::path::Path;

use catena_kernel::Session;

use super::render_value;

/// Show the state of a chain directory: head, store sizes, and the audit
/// trail of executed steps.
pub fn run(dir: &Path) -> anyhow::Result<()> {
    let session = Session::open(dir)?;

    match session.head() {
        Some(head) => println!("Head:        {head}"),
        None => println!("Head:        (uninitialized)"),
    }
    println!("Commitments: {}", session.commitment_count());
    println!("Steps:       {}", session.step_count());
    println!("Proofs:      {}", session.proof_count());
    println!("Unproven:    {}", session.unproven_count());

    let audit = session.audit_trail();
    if !audit.is_empty() {
        println!("\nSteps:");
        for record in &audit {
            println!(
                "  #{:<4} {} --[{}]--> {}  (output {})",
                record.index,
                record.prior,
                render_value(&record.input),
                record.new_head,
                render_value(&record.output),
            );
        }
    }

    Ok(())
}
