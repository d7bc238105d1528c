use std::path::Path;

use anyhow::Context;
use catena_kernel::{ProofId, Session, VerificationResult};

use super::render_value;

/// Check a stored proof against its identifier.
///
/// A failing proof is reported as a negative verdict and a non-zero exit;
/// an unknown identifier is an error outright.
pub fn run(dir: &Path, identifier: &str) -> anyhow::Result<VerificationResult> {
    let id: ProofId = identifier
        .parse()
        .with_context(|| format!("cannot parse proof identifier `{identifier}`"))?;

    let session = Session::open(dir)?;
    let result = session.verify(&id)?;

    match &result {
        VerificationResult::Verified(claim) => {
            println!("\n✅ VERIFIED\n");
            println!("Prior head: {}", claim.prior);
            println!("Input:      {}", render_value(&claim.input));
            println!("Output:     {}", render_value(&claim.output));
            println!("New head:   {}", claim.new_head);
            Ok(result)
        }
        VerificationResult::Rejected(reason) => {
            println!("\n❌ REJECTED\n");
            println!("Reason: {reason}");
            anyhow::bail!("proof {id} failed verification: {reason}");
        }
    }
}
