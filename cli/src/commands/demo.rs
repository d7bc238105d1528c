use catena_kernel::{fixtures, Session, Value};

use super::render_value;

/// Run the counter transcript end to end in an ephemeral session:
/// commit a counter at 0, chain 9 / 12 / 14, prove and verify every step.
pub fn run() -> anyhow::Result<()> {
    let session = Session::in_memory();

    let genesis = session.commit_payload(fixtures::counter(0))?;
    println!("commit  -> {genesis}");

    let mut head = genesis;
    for input in [9i64, 12, 14] {
        let (output, new_head) = session.chain(head, Value::Num(input))?;
        println!(
            "chain   {input:>3} -> output {}, head {new_head}",
            render_value(&output)
        );
        head = new_head;

        let id = session.prove()?;
        println!("prove   -> {id}");

        let result = session.verify(&id)?;
        anyhow::ensure!(result.is_verified(), "demo proof failed verification");
        println!("verify  -> ok");
    }

    println!("\nFinal head: {head}");
    Ok(())
}
