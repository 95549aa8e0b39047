use crate::cli::MethodArgs;
use crate::commands::preview::{load_and_plan, print_plan};
use crate::split::split_to_archive;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

pub async fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    method: &MethodArgs,
    output_dir: Q,
) -> Result<()> {
    let output_dir = output_dir.as_ref();

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let (pdf, plan) = load_and_plan(&input, method).await?;
    print_plan(&plan);

    let bytes = split_to_archive(&pdf, &plan, |stage| info!("{}", stage))?;

    let output_path = output_dir.join(plan.archive_name());
    std::fs::write(&output_path, &bytes)
        .with_context(|| format!("Failed to write archive: {}", output_path.display()))?;

    println!(
        "Split {} pages into {} files: {}",
        pdf.page_count(),
        plan.len(),
        output_path.display()
    );

    Ok(())
}
