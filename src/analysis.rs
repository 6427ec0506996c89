//! The event loop
//!
//! [Analysis] reads events one at a time, applies the
//! [PhotonSelector], reconstructs the diphoton mass of selected
//! events, and fills it into a [Histogram]. At the end of the event
//! stream, or once the configured number of events has been
//! processed, the finalized histogram is passed on to an [Output].
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    event::EventRecord,
    histogram::{FinalHistogram, Histogram},
    reconstruct::diphoton_mass,
    selection::{NumericError, PhotonSelector, Rejection, Selection},
    traits::{Output, Progress},
};

/// State of the event loop
#[derive(
    Copy, Clone, Debug, Default, Display, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
pub enum DriverState {
    #[default]
    Running,
    /// The maximum number of events has been processed
    StoppedByLimit,
    /// All events have been read
    StoppedByExhaustion,
    /// Reading an event failed
    Failed,
}

/// Number of events rejected by each cut
#[derive(Serialize, Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Cutflow {
    pub trigger: u64,
    pub multiplicity: u64,
    pub isolation: u64,
}

impl Cutflow {
    fn reject(&mut self, reason: Rejection) {
        match reason {
            Rejection::Trigger => self.trigger += 1,
            Rejection::Multiplicity(_) => self.multiplicity += 1,
            Rejection::Isolation => self.isolation += 1,
        }
    }
}

/// Counters for a single run
#[derive(Serialize, Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct RunStats {
    /// Number of events read
    pub processed: u64,
    /// Number of events filled into the histogram
    pub selected: u64,
    /// Number of events skipped because of invalid numerical input
    pub skipped: u64,
    pub cutflow: Cutflow,
    /// Time spent in the event loop
    pub elapsed: Duration,
}

/// Result of a successful run
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    pub state: DriverState,
    pub stats: RunStats,
    pub histogram: FinalHistogram,
}

#[derive(Debug, Error)]
pub enum AnalysisError<E1, E2> {
    #[error("Failed to read event: {0}")]
    ReadErr(E1),
    #[error("Failed to write output: {0}")]
    OutputErr(E2),
    #[error("Analysis cannot be run again, state is {0}")]
    NotRunning(DriverState),
}

/// Single-pass diphoton mass analysis
#[derive(TypedBuilder)]
pub struct Analysis<R, O, P> {
    /// Source of events
    reader: R,
    /// Where to send the final histogram
    output: O,
    progress: P,
    #[builder(default)]
    selector: PhotonSelector,
    #[builder(default)]
    histogram: Histogram,
    /// Maximum number of events to process. 0 means no limit.
    #[builder(default)]
    max_events: u64,
    /// Name of the run for logging
    #[builder(default = String::from("analysis"), setter(into))]
    name: String,
    #[builder(default, setter(skip))]
    state: DriverState,
    #[builder(default, setter(skip))]
    stats: RunStats,
}

impl<R, O, P, E> Analysis<R, O, P>
where
    R: Iterator<Item = Result<EventRecord, E>>,
    O: Output,
    P: Progress,
{
    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Process all events and write the result
    ///
    /// Stops after `max_events` events if a limit is set. Events with
    /// invalid numerical content are skipped with a warning. If
    /// reading an event fails, no output is written.
    pub fn run(&mut self) -> Result<RunOutcome, AnalysisError<E, O::Error>> {
        use AnalysisError::*;
        use DriverState::*;

        if self.state != Running {
            return Err(NotRunning(self.state));
        }
        debug!("Selection cuts: {:#?}", self.selector.cuts());
        let start = Instant::now();
        let state = loop {
            if self.max_events > 0 && self.stats.processed >= self.max_events {
                break StoppedByLimit;
            }
            let event = match self.reader.next() {
                Some(Ok(event)) => event,
                Some(Err(err)) => {
                    self.state = Failed;
                    self.stats.elapsed = start.elapsed();
                    return Err(ReadErr(err));
                }
                None => break StoppedByExhaustion,
            };
            self.stats.processed += 1;
            self.progress.inc(1);
            if let Err(err) = self.process(&event) {
                warn!("Skipping event {}: {err}", self.stats.processed);
                self.stats.skipped += 1;
            }
        };
        self.progress.finish();
        self.state = state;
        self.stats.elapsed = start.elapsed();
        info!(
            "{}: selected {} out of {} events",
            state, self.stats.selected, self.stats.processed
        );
        debug!("Event counts: {:#?}", self.stats);

        let histogram = std::mem::take(&mut self.histogram).finalize();
        self.output
            .output(&histogram, &self.stats)
            .map_err(OutputErr)?;

        let duration = start.elapsed().as_secs();
        info!(
            "Finished {} in {} min {} s",
            self.name,
            duration / 60,
            duration % 60
        );
        Ok(RunOutcome {
            state,
            stats: self.stats,
            histogram,
        })
    }

    fn process(&mut self, event: &EventRecord) -> Result<(), NumericError> {
        match self.selector.select(event)? {
            Selection::Rejected(reason) => {
                trace!("Event {} rejected: {reason}", self.stats.processed);
                self.stats.cutflow.reject(reason);
            }
            Selection::Passed([i1, i2]) => {
                let mass = diphoton_mass(event, i1, i2)?;
                trace!("Event {} selected with m = {mass}", self.stats.processed);
                self.histogram.fill(mass);
                self.stats.selected += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, convert::Infallible};

    use super::*;
    use crate::{
        event::{EventBuilder, Photon},
        progress::{ProgressLog, NO_PROGRESS},
        selection::PhotonCuts,
    };

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(FinalHistogram, RunStats)>,
    }

    impl Output for Recorder {
        type Error = Infallible;

        fn output(
            &mut self,
            hist: &FinalHistogram,
            stats: &RunStats,
        ) -> Result<(), Self::Error> {
            self.calls.push((hist.clone(), *stats));
            Ok(())
        }
    }

    fn photon(pt: f64, eta: f64, phi: f64, e: f64) -> Photon {
        Photon {
            is_tight_id: true,
            pt,
            eta,
            phi,
            e,
            ptcone30: 0.,
            etcone20: 0.,
        }
    }

    fn event(trigger: bool, photons: &[Photon]) -> EventRecord {
        let mut builder = EventBuilder::new();
        builder.trigger(trigger);
        for photon in photons {
            builder.add_photon(*photon);
        }
        builder.build()
    }

    // two photons with m_γγ = 120 GeV
    fn higgs_like() -> EventRecord {
        event(
            true,
            &[
                photon(60_000., 0., 0., 60_000.),
                photon(60_000., 0., std::f64::consts::PI, 60_000.),
            ],
        )
    }

    fn ok(
        events: Vec<EventRecord>,
    ) -> impl Iterator<Item = Result<EventRecord, Infallible>> {
        events.into_iter().map(Ok)
    }

    fn run_events(events: Vec<EventRecord>) -> (RunOutcome, Recorder) {
        let mut recorder = Recorder::default();
        let outcome = Analysis::builder()
            .reader(ok(events))
            .output(&mut recorder)
            .progress(NO_PROGRESS)
            .build()
            .run()
            .unwrap();
        (outcome, recorder)
    }

    #[test]
    fn trigger_not_fired() {
        log_init();
        let photons = higgs_like().photons().to_vec();
        let (outcome, _) = run_events(vec![event(false, &photons)]);
        assert_eq!(outcome.histogram.entries, 0);
        assert_eq!(outcome.stats.processed, 1);
        assert_eq!(outcome.stats.cutflow.trigger, 1);
    }

    #[test]
    fn three_good_photons() {
        log_init();
        let p = photon(60_000., 0., 0., 60_000.);
        let (outcome, _) = run_events(vec![event(true, &[p, p, p])]);
        assert_eq!(outcome.histogram.entries, 0);
        assert_eq!(outcome.stats.cutflow.multiplicity, 1);
    }

    #[test]
    fn single_fill() {
        log_init();
        let ev = event(
            true,
            &[
                photon(50_000., 0.1, 0., 52_000.),
                photon(40_000., -0.2, 3., 41_000.),
            ],
        );
        let (outcome, recorder) = run_events(vec![ev]);
        let hist = outcome.histogram;
        assert_eq!(hist.entries, 1);
        // m_γγ ≈ 92.19 GeV is below the histogram range
        assert_eq!(hist.underflow, 1);
        assert_eq!(hist.bins.iter().sum::<u64>(), 0);
        assert_eq!(outcome.stats.selected, 1);
        assert_eq!(recorder.calls.len(), 1);

        let (outcome, _) = run_events(vec![higgs_like()]);
        // 120 GeV is in bin (120 - 105) / (55 / 30) = 8.18
        assert_eq!(outcome.histogram.bins[8], 1);
        assert_eq!(outcome.histogram.entries, 1);
    }

    #[test]
    fn limit() {
        log_init();
        let pulled = Cell::new(0);
        let reader = (0..100).map(|_| {
            pulled.set(pulled.get() + 1);
            Ok::<_, Infallible>(higgs_like())
        });
        let mut recorder = Recorder::default();
        let mut analysis = Analysis::builder()
            .reader(reader)
            .output(&mut recorder)
            .progress(ProgressLog::new(3))
            .max_events(10)
            .build();
        let outcome = analysis.run().unwrap();
        assert_eq!(outcome.state, DriverState::StoppedByLimit);
        assert_eq!(analysis.state(), DriverState::StoppedByLimit);
        assert_eq!(outcome.stats.processed, 10);
        assert_eq!(outcome.histogram.entries, 10);
        assert_eq!(pulled.get(), 10);
        assert!(matches!(
            analysis.run(),
            Err(AnalysisError::NotRunning(DriverState::StoppedByLimit))
        ));
        drop(analysis);
        assert_eq!(recorder.calls.len(), 1);
    }

    #[test]
    fn empty() {
        log_init();
        let (outcome, recorder) = run_events(vec![]);
        assert_eq!(outcome.state, DriverState::StoppedByExhaustion);
        assert_eq!(outcome.stats.processed, 0);
        assert_eq!(outcome.histogram.entries, 0);
        assert_eq!(outcome.histogram.bins.len(), 30);
        assert_eq!(recorder.calls.len(), 1);
    }

    #[test]
    fn read_error() {
        log_init();
        let reader = vec![Ok(higgs_like()), Err("broken record"), Ok(higgs_like())];
        let mut recorder = Recorder::default();
        let mut analysis = Analysis::builder()
            .reader(reader.into_iter())
            .output(&mut recorder)
            .progress(NO_PROGRESS)
            .build();
        assert!(matches!(
            analysis.run(),
            Err(AnalysisError::ReadErr("broken record"))
        ));
        assert_eq!(analysis.state(), DriverState::Failed);
        assert_eq!(analysis.stats().processed, 1);
        assert!(matches!(
            analysis.run(),
            Err(AnalysisError::NotRunning(DriverState::Failed))
        ));
        drop(analysis);
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn skip_invalid() {
        log_init();
        // energy below momentum: negative mass square
        let space_like = event(
            true,
            &[
                photon(60_000., 0., 0., 10_000.),
                photon(60_000., 0., 0.1, 10_000.),
            ],
        );
        let (outcome, _) = run_events(vec![space_like, higgs_like()]);
        assert_eq!(outcome.state, DriverState::StoppedByExhaustion);
        assert_eq!(outcome.stats.processed, 2);
        assert_eq!(outcome.stats.skipped, 1);
        assert_eq!(outcome.stats.selected, 1);
        assert_eq!(outcome.histogram.entries, 1);
    }

    #[test]
    fn skip_overflow() {
        log_init();
        // finite momenta whose mass square overflows
        let huge = event(
            true,
            &[photon(1e308, 0., 0., 1e308), photon(1e308, 0., 1., 1e308)],
        );
        let (outcome, _) = run_events(vec![huge]);
        assert_eq!(outcome.state, DriverState::StoppedByExhaustion);
        assert_eq!(outcome.stats.processed, 1);
        assert_eq!(outcome.stats.skipped, 1);
        assert_eq!(outcome.stats.selected, 0);
        assert_eq!(outcome.histogram.entries, 0);
        assert!(outcome.histogram.bins.iter().all(|&n| n == 0));
    }

    fn event_grid() -> Vec<EventRecord> {
        let mut events = Vec::new();
        let pts = [10_000., 15_000., 32_000., 55_000.];
        let etas = [0.3, -1.4, 1.8, -2.5];
        let isos = [0., 0.05, 0.1];
        for (n, &trigger) in [true, false].iter().enumerate() {
            for (i, &pt) in pts.iter().enumerate() {
                for &eta in &etas {
                    for &iso in &isos {
                        let phi = 0.7 * (i + n) as f64;
                        let mut p1 = photon(pt, eta, phi, 1.2 * pt * f64::cosh(eta));
                        p1.ptcone30 = iso * pt;
                        let p2 = photon(45_000., -0.5, -phi, 60_000.);
                        let p3 = photon(pt + 1000., -eta, 2. * phi, 2. * pt * f64::cosh(eta));
                        events.push(event(trigger, &[p1, p2]));
                        events.push(event(trigger, &[p2, p1, p3]));
                    }
                }
            }
        }
        events
    }

    #[test]
    fn fills_match_selection() {
        log_init();
        let events = event_grid();
        let selector = PhotonSelector::default();
        let passed = events
            .iter()
            .filter(|e| selector.select(e).unwrap().passed())
            .count() as u64;
        assert!(passed > 0);
        let (outcome, _) = run_events(events.clone());
        assert_eq!(outcome.histogram.entries, passed);
        assert_eq!(outcome.stats.selected, passed);
        let cutflow = outcome.stats.cutflow;
        assert_eq!(
            cutflow.trigger + cutflow.multiplicity + cutflow.isolation + passed,
            events.len() as u64
        );
    }

    #[test]
    fn reproducible() {
        log_init();
        let (first, _) = run_events(event_grid());
        let (second, _) = run_events(event_grid());
        assert_eq!(first.histogram, second.histogram);
    }

    #[test]
    fn custom_cuts() {
        log_init();
        let cuts = PhotonCuts::default().with_min_pt(60_000.);
        let mut recorder = Recorder::default();
        let outcome = Analysis::builder()
            .reader(ok(vec![higgs_like()]))
            .output(&mut recorder)
            .progress(NO_PROGRESS)
            .selector(PhotonSelector::new(cuts))
            .histogram(Histogram::new(10, 100., 150.).unwrap())
            .name("custom")
            .build()
            .run()
            .unwrap();
        assert_eq!(outcome.histogram.entries, 0);
        assert_eq!(outcome.histogram.bins.len(), 10);
    }
}
