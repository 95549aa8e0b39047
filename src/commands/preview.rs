use crate::cli::MethodArgs;
use crate::delimiter::Detector;
use crate::pdf::SourcePdf;
use crate::plan::SplitPlan;
use crate::split::{self, SplitMethod, Stage};
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub async fn run<P: AsRef<Path>>(path: P, method: &MethodArgs) -> Result<()> {
    let (_, plan) = load_and_plan(path, method).await?;
    print_plan(&plan);
    Ok(())
}

/// Load the file and compute its split plan, the shared front half of `preview` and `split`
pub async fn load_and_plan<P: AsRef<Path>>(
    path: P,
    method: &MethodArgs,
) -> Result<(SourcePdf, SplitPlan)> {
    info!("{}", Stage::Analyzing);
    let pdf = SourcePdf::open(&path)?;

    let request = method.request();
    let detector = match request.method {
        SplitMethod::Delimiter => Some(Detector::new(method.detector, &method.llm)?),
        SplitMethod::Pages => None,
    };

    info!("{}", Stage::Previewing);
    let plan = split::preview(&pdf, &request, detector.as_ref()).await?;
    Ok((pdf, plan))
}

pub fn print_plan(plan: &SplitPlan) {
    println!("Your PDF will be split into {} documents.", plan.len());
    for (i, span) in plan.spans.iter().enumerate() {
        println!(
            "{}  Pages {} - {}",
            plan.part_name(i),
            span.start,
            span.end
        );
    }
}
