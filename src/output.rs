use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use serde::Serialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    analysis::RunStats,
    histogram::FinalHistogram,
    plot::{plot_histogram, PlotError},
    traits::Output,
};

/// Default output directory
pub const DEFAULT_OUTDIR: &str = "plots";

/// Write the final histogram to `<outdir>/histogram_<name>.{yaml,svg}`
#[derive(Clone, Debug, TypedBuilder)]
pub struct OutputWriter {
    #[builder(default = PathBuf::from(DEFAULT_OUTDIR), setter(into))]
    outdir: PathBuf,
    /// Base name of the output files, usually derived from the input file
    #[builder(setter(into))]
    name: String,
}

impl OutputWriter {
    /// Path of the histogram data file
    pub fn data_path(&self) -> PathBuf {
        self.outdir.join(format!("histogram_{}.yaml", self.name))
    }

    /// Path of the histogram plot
    pub fn plot_path(&self) -> PathBuf {
        self.outdir.join(format!("histogram_{}.svg", self.name))
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    histogram: &'a FinalHistogram,
    stats: &'a RunStats,
}

impl Output for OutputWriter {
    type Error = OutputError;

    fn output(
        &mut self,
        hist: &FinalHistogram,
        stats: &RunStats,
    ) -> Result<(), Self::Error> {
        create_dir_all(&self.outdir).map_err(|err| OutputError::CreateDir {
            path: self.outdir.clone(),
            err,
        })?;

        let path = self.data_path();
        let file = File::create(&path).map_err(|err| OutputError::CreateFile {
            path: path.clone(),
            err,
        })?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(
            &mut out,
            &Summary {
                histogram: hist,
                stats,
            },
        )?;
        out.flush()?;
        info!("Histogram written to {path:?}");

        let path = self.plot_path();
        plot_histogram(hist, &path)?;
        info!("Plot written to {path:?}");
        Ok(())
    }
}

/// Base name for output files derived from the input file name
///
/// This is the file name without directory and without the last
/// extension. Compressed input like `data.txt.gz` gives `data.txt`.
pub fn output_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned())
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create directory {path:?}: {err}")]
    CreateDir {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("Failed to create {path:?}: {err}")]
    CreateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialise histogram: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Plot(#[from] PlotError),
}
