use anyhow::{bail, Context, Result};
use terragear::{construct_area, CancelToken, ConstructConfig};

/// Assemble the run configuration: file values first, then flags on top.
fn load_config(cli: &crate::cli::Cli) -> Result<ConstructConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("[construct] Failed to read config {}", path.display()))?;
            ConstructConfig::from_json(&text)
                .with_context(|| format!("[construct] Bad config {}", path.display()))?
        }
        None => ConstructConfig::default(),
    };

    config.work_base = cli.work_base.clone();
    config.output_base = cli.output_base.clone();
    if !cli.buckets.is_empty() { config.buckets = cli.buckets.clone(); }
    if !cli.bounds.is_empty() {
        config.bounds = Some(<[f64; 4]>::try_from(cli.bounds.as_slice()).context("[construct] --bounds takes four values")?);
    }
    if let Some(style) = cli.style { config.style = style; }
    if cli.gzip { config.gzip = true; }

    config.validate().context("[construct] Invalid configuration")?;
    Ok(config)
}

pub fn run(cli: &crate::cli::Cli) -> Result<()> {
    let config = load_config(cli)?;

    println!("[construct] building tiles from {} into {}", config.work_base.display(), config.output_base.display());
    let summary = construct_area(&config, &CancelToken::new())?;

    println!("[construct] {summary}");
    for report in &summary.succeeded {
        log::info!("{}: {} nodes, {} triangles -> {}", report.bucket, report.nodes, report.triangles, report.path.display());
    }

    if !summary.is_success() {
        bail!("{} bucket(s) failed", summary.failed.len());
    }
    Ok(())
}
