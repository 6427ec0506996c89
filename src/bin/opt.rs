use std::path::PathBuf;

use clap::Parser;
use diphoton::{
    output::DEFAULT_OUTDIR, progress::DEFAULT_INTERVAL, reader::DEFAULT_TREE,
};
use thiserror::Error;

#[derive(Debug, Default, Clone, Parser)]
pub(crate) struct CutOpt {
    /// Minimum photon transverse momentum in MeV.
    #[clap(long)]
    pub(crate) photon_pt: Option<f64>,

    /// Maximum relative isolation energy.
    ///
    /// Both `ptcone30 / pt` and `etcone20 / pt` have to be below
    /// this value.
    #[clap(long)]
    pub(crate) isolation: Option<f64>,

    /// Maximum absolute photon pseudorapidity.
    #[clap(long)]
    pub(crate) max_abs_eta: Option<f64>,

    /// Lower edge of the excluded calorimeter transition region in |η|.
    #[clap(long)]
    pub(crate) crack_low: Option<f64>,

    /// Upper edge of the excluded calorimeter transition region in |η|.
    #[clap(long)]
    pub(crate) crack_high: Option<f64>,

    /// YAML file with photon selection cuts.
    ///
    /// Options given on the command line take precedence.
    #[clap(long, value_parser)]
    pub(crate) cuts: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[clap(about, version)]
pub(crate) struct Opt {
    /// Output directory.
    ///
    /// The histogram is written to `histogram_<name>.yaml` and
    /// `histogram_<name>.svg` in this directory, where `<name>` is
    /// the input file name without extension.
    #[clap(long, short, value_parser, default_value = DEFAULT_OUTDIR)]
    pub(crate) outdir: PathBuf,

    #[clap(flatten)]
    pub(crate) cuts: CutOpt,

    /// Number of events between two progress reports.
    #[clap(long, default_value_t = DEFAULT_INTERVAL)]
    pub(crate) progress_interval: u64,

    /// Name of the event collection in the input file.
    #[clap(long, default_value = DEFAULT_TREE)]
    pub(crate) tree: String,

    /// Verbosity level
    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.
Possible values with increasing amount of output are
'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,

    /// Input event file
    #[clap(name = "INFILE", value_parser)]
    pub(crate) infile: Option<PathBuf>,

    /// Maximum number of events to process.
    ///
    /// Zero or a negative number means all events.
    #[clap(name = "MAX_EVENTS", allow_negative_numbers = true)]
    pub(crate) max_events: Option<i64>,
}

impl Opt {
    pub(crate) fn validate(self) -> Result<Self, ValidationError> {
        if self.infile.is_none() {
            return Err(ValidationError::MissingInput);
        }
        if self.progress_interval == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        if let (Some(low), Some(high)) =
            (self.cuts.crack_low, self.cuts.crack_high)
        {
            if low > high {
                return Err(ValidationError::BadCrack(low, high));
            }
        }
        Ok(self)
    }

    /// Event cap, where 0 means no limit
    pub(crate) fn event_limit(&self) -> u64 {
        self.max_events
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub(crate) enum ValidationError {
    #[error("No input file given")]
    MissingInput,
    #[error("--progress-interval has to be positive")]
    ZeroInterval,
    #[error("Lower crack bound {0} is above upper bound {1}")]
    BadCrack(f64, f64),
}
