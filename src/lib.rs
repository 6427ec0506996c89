//! `diphoton` reconstructs the invariant mass of photon pairs in
//! collider events and collects it in a histogram, as in searches for
//! the Higgs boson decay to two photons.
//!
//! # How to use
//!
//! ```no_run
//! use diphoton::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let reader = FileReader::open("data_A.txt", "mini")?;
//! let output = OutputWriter::builder().name("data_A").build();
//! let mut analysis = Analysis::builder()
//!     .reader(reader)
//!     .output(output)
//!     .progress(ProgressLog::default())
//!     .build();
//! let outcome = analysis.run()?;
//! println!("{} events selected", outcome.stats.selected);
//! # Ok(())
//! # }
//! ```
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [analysis] contains the event loop
//! - [selection] for the photon selection
//! - [reconstruct] for the diphoton mass
//! - [histogram] for the mass histogram
//! - [reader] and [writer] for event files
//! - [output] for writing the final histogram and plot
//!

/// The event loop
pub mod analysis;
/// Event record format
pub mod event;
/// Four-vector class
pub mod four_vector;
/// Fixed-binning histograms
pub mod histogram;
/// Histogram output
pub mod output;
/// Histogram plotting
pub mod plot;
/// Most important exports
pub mod prelude;
/// Progress reports
pub mod progress;
/// Event readers
pub mod reader;
/// Invariant mass reconstruction
pub mod reconstruct;
/// Photon selection
pub mod selection;
/// Common traits
pub mod traits;
/// Event writer
pub mod writer;

mod parsing;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
