mod opt;

use std::{fs::File, io::BufReader, path::Path};

use crate::opt::{CutOpt, Opt};

use anyhow::{bail, Context, Result};
use clap::Parser;
use diphoton::{
    analysis::Analysis,
    output::{output_base_name, OutputWriter},
    progress::ProgressLog,
    reader::FileReader,
    selection::{PhotonCuts, PhotonSelector},
    GIT_BRANCH, GIT_REV, VERSION,
};
use env_logger::Env;
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args).validate()?;

    let env = Env::default().filter_or("DIPHOTON_LOG", &opt.loglevel);
    env_logger::init_from_env(env);

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("diphoton {VERSION} rev {rev} ({branch})");
    } else {
        info!("diphoton {VERSION}");
    }
    debug!("settings: {:#?}", opt);

    let cuts = photon_cuts(&opt.cuts)?;
    let infile = opt.infile.as_deref().context("No input file given")?;
    let reader = FileReader::open(infile, &opt.tree)
        .with_context(|| format!("Failed to read events from {infile:?}"))?;

    let name = output_base_name(infile);
    let output = OutputWriter::builder()
        .outdir(opt.outdir.clone())
        .name(name.as_str())
        .build();

    let mut analysis = Analysis::builder()
        .reader(reader)
        .output(output)
        .progress(ProgressLog::new(opt.progress_interval))
        .selector(PhotonSelector::new(cuts))
        .max_events(opt.event_limit())
        .name(name)
        .build();
    let outcome = analysis.run()?;
    info!(
        "Selected {} of {} events, skipped {}",
        outcome.stats.selected, outcome.stats.processed, outcome.stats.skipped
    );
    Ok(())
}

fn photon_cuts(opt: &CutOpt) -> Result<PhotonCuts> {
    let mut cuts = match &opt.cuts {
        Some(path) => read_cuts(path)?,
        None => PhotonCuts::default(),
    };
    if let Some(pt) = opt.photon_pt {
        cuts = cuts.with_min_pt(pt);
    }
    if let Some(iso) = opt.isolation {
        cuts = cuts.with_max_isolation(iso);
    }
    if let Some(eta) = opt.max_abs_eta {
        cuts = cuts.with_max_abs_eta(eta);
    }
    let low = opt.crack_low.unwrap_or(cuts.crack_low);
    let high = opt.crack_high.unwrap_or(cuts.crack_high);
    if low > high {
        bail!("Lower crack bound {low} is above upper bound {high}");
    }
    Ok(cuts.with_crack(low, high))
}

fn read_cuts(path: &Path) -> Result<PhotonCuts> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open cut file {path:?}"))?;
    serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse cut file {path:?}"))
}
