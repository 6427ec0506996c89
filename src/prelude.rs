pub use crate::{
    analysis::{Analysis, DriverState, RunOutcome, RunStats},
    event::{EventRecord, Photon},
    histogram::{FinalHistogram, Histogram},
    output::OutputWriter,
    progress::{ProgressLog, NO_PROGRESS},
    reader::FileReader,
    selection::{PhotonCuts, PhotonSelector},
    traits::{Output, Progress},
    writer::Writer,
};
