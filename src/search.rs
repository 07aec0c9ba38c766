//! One search session: discover, start, query, rank, print, close
//!
//! The orchestration is strictly sequential and single-threaded; the only
//! blocking points are the engine pipe write and the bounded response wait
//! inside [`EngineSession::query`]. Exactly one engine session exists per
//! invocation, and it is closed before any query failure propagates, so the
//! subprocess is never leaked on an error path (the session's `Drop` covers
//! panics and early returns elsewhere).

use crate::candidates;
use crate::engine::{EngineConfig, EngineSession};
use crate::output;
use crate::rank;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Everything one search run needs, assembled by the CLI layer.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Query strings describing a single concept
    pub queries: Vec<String>,
    /// Maximum number of results to print
    pub topk: usize,
    /// Engine launch and timeout settings
    pub engine: EngineConfig,
    /// Emit a JSON array instead of ranked lines
    pub json: bool,
    /// Colored output
    pub color: bool,
}

/// Run one full query cycle and print the ranked results.
pub fn run_search(request: &SearchRequest) -> Result<()> {
    let root = &request.engine.working_dir;
    let candidates = candidates::discover(root)
        .with_context(|| format!("failed to enumerate images under {}", root.display()))?;

    if candidates.is_empty() {
        bail!("no candidate images found under {}", root.display());
    }

    let mut session = EngineSession::new(request.engine.clone());
    session
        .start(&candidates)
        .context("could not start the scoring engine")?;

    // Tear the engine down before surfacing any query failure
    let scores = session.query(&request.queries);
    session.close();
    let scores = scores.context("query failed")?;

    let ranked = rank::rank(&scores, request.topk);
    if request.json {
        output::print_json(&ranked)?;
    } else {
        output::print_ranked(&ranked, request.color)?;
    }

    Ok(())
}

/// List the candidate images a search over `root` would consider.
pub fn run_list(root: &Path) -> Result<()> {
    let candidates = candidates::discover(root)
        .with_context(|| format!("failed to enumerate images under {}", root.display()))?;

    for name in candidates {
        println!("{}", name);
    }
    Ok(())
}
