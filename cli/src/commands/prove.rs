use std::path::Path;

use catena_kernel::{ProofId, Session};

/// Prove the most recent unproven chain step. The proof is retained in the
/// session's proof store; only its identifier is reported.
pub fn run(dir: &Path) -> anyhow::Result<ProofId> {
    let session = Session::open(dir)?;
    let id = session.prove()?;

    println!("Proof key: {id}");
    Ok(id)
}
