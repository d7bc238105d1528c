use std::path::{Path, PathBuf};

use anyhow::Context;
use catena_kernel::{Commitment, Expr, Session};

/// Evaluate an expression and commit the resulting closure.
///
/// The expression is supplied as JSON (the canonical serde form of `Expr`),
/// either inline or from a file.
pub fn run(dir: &Path, expr: Option<&str>, file: Option<&PathBuf>) -> anyhow::Result<Commitment> {
    let source = match (expr, file) {
        (Some(inline), None) => inline.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read expression file {}", path.display()))?,
        _ => anyhow::bail!("provide exactly one of --expr or --file"),
    };
    let expr: Expr = serde_json::from_str(&source).context("cannot parse expression")?;

    let session = Session::open(dir)?;
    let commitment = session.commit_expr(&expr)?;

    println!("Committed: {commitment}");
    Ok(commitment)
}
