use stevedore_build::{DepsLayer, ManifestPatterns, SyncReport};

use super::Context;

/// Mirror manifests into the deps layer, printing one line per copy written.
pub(crate) fn sync(ctx: &Context) -> anyhow::Result<SyncReport> {
    let patterns = ManifestPatterns::new(&ctx.settings.manifest_patterns)?;
    if patterns.is_empty() {
        tracing::warn!("no manifest patterns configured; deps layer will stay empty");
    }

    let layer = DepsLayer::new(&ctx.project_dir, &ctx.settings.mirror_dir, patterns);
    let report = layer.sync(|update| println!("{update}"))?;

    if report.is_fresh() {
        tracing::info!(manifests = report.scanned(), "deps layer up to date");
    }
    Ok(report)
}

pub fn sync_deps(ctx: &Context) -> anyhow::Result<()> {
    sync(ctx)?;
    Ok(())
}
