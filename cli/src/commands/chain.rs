use std::path::Path;

use anyhow::Context;
use catena_kernel::{Commitment, Session, Value};

use super::{parse_value, render_value};

/// Execute one chain step against the live head.
pub fn run(dir: &Path, commitment: &str, input: &str) -> anyhow::Result<(Value, Commitment)> {
    let prior: Commitment = commitment
        .parse()
        .with_context(|| format!("cannot parse commitment `{commitment}`"))?;
    let input = parse_value(input)?;

    tracing::debug!(dir = %dir.display(), %prior, "running chain step");

    let session = Session::open(dir)?;
    let (output, new_head) = session.chain(prior, input)?;

    println!("Output:     {}", render_value(&output));
    println!("New head:   {new_head}");
    Ok((output, new_head))
}
