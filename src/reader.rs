use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::{debug, trace};
use thiserror::Error;

use crate::{
    event::{EventBuilder, EventRecord, Photon},
    parsing::{any_entry, double_entry, flag_entry, line_end, u32_entry},
};

/// Name of the event collection expected by default
pub const DEFAULT_TREE: &str = "mini";

// the photon count in a record is untrusted
const MAX_PREALLOC_PHOTONS: usize = 16;

/// Reader for event records in the line-based text format
///
/// A file starts with a header line `T <name>` naming the event
/// collection. Each event consists of a line
///
/// `E <trigger> <number of photons>`
///
/// followed by one line per photon
///
/// `P <tight ID> <pt> <eta> <phi> <E> <ptcone30> <etcone20>`.
///
/// Flags are `0` or `1`, momenta and energies are in MeV. Empty lines
/// and lines starting with `#` are ignored.
///
/// The reader is a lazy, finite iterator over events. It cannot be
/// rewound; open the source again to start over.
pub struct Reader<R> {
    source: R,
    line_nr: usize,
}

/// Reader for a single (potentially compressed) event file
pub type FileReader = Reader<Box<dyn BufRead>>;

impl FileReader {
    /// Open the event file at `path` and check that it contains
    /// the collection `tree`
    pub fn open<P: AsRef<Path>>(path: P, tree: &str) -> Result<Self, CreateError> {
        let path = path.as_ref();
        if let Some(reference) = path.to_str() {
            if let Some((scheme, _)) = reference.split_once("://") {
                if scheme != "file" {
                    return Err(CreateError::UnsupportedUrl(reference.to_owned()));
                }
                return Self::open(&reference[scheme.len() + 3..], tree);
            }
        }
        let file = File::open(path).map_err(|err| CreateError::Open {
            path: path.to_owned(),
            err,
        })?;
        debug!("Reading events from {path:?}");
        let source = auto_decompress(BufReader::new(file));
        Reader::new(source, tree)
    }
}

impl<R: BufRead> Reader<R> {
    /// Read events from `source`, which has to contain the collection `tree`
    pub fn new(source: R, tree: &str) -> Result<Self, CreateError> {
        let mut reader = Self { source, line_nr: 0 };
        let Some(header) = reader.next_record_line()? else {
            return Err(CreateError::Empty);
        };
        let found = parse_header_line(&header).map_err(|_| {
            CreateError::NoHeader {
                line: reader.line_nr,
                record: header.clone(),
            }
        })?;
        if found != tree {
            return Err(CreateError::TreeNotFound {
                expected: tree.to_owned(),
                found: found.to_owned(),
            });
        }
        debug!("Found event collection '{found}'");
        Ok(reader)
    }

    fn next_record_line(&mut self) -> Result<Option<String>, std::io::Error> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.source.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_nr += 1;
            let record = line.trim();
            if !record.is_empty() && !record.starts_with('#') {
                return Ok(Some(record.to_owned()));
            }
        }
    }

    fn parse_error(&self, record: &str, err: impl ToString) -> EventReadError {
        EventReadError::Parse {
            line: self.line_nr,
            record: record.to_owned(),
            msg: err.to_string(),
        }
    }

    fn read_event(&mut self) -> Option<Result<EventRecord, EventReadError>> {
        let record = match self.next_record_line() {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(err) => return Some(Err(err.into())),
        };
        Some(self.read_event_from(&record))
    }

    fn read_event_from(
        &mut self,
        record: &str,
    ) -> Result<EventRecord, EventReadError> {
        let (trigger, nphotons) = parse_event_line(record)
            .map_err(|err| self.parse_error(record, err))?;
        let capacity = std::cmp::min(nphotons as usize, MAX_PREALLOC_PHOTONS);
        let mut event = EventBuilder::with_capacity(capacity);
        event.trigger(trigger);
        for _ in 0..nphotons {
            let Some(record) = self.next_record_line()? else {
                return Err(EventReadError::Truncated {
                    line: self.line_nr,
                    expected: nphotons,
                });
            };
            let photon = parse_photon_line(&record)
                .map_err(|err| self.parse_error(&record, err))?;
            event.add_photon(photon);
        }
        let event = event.build();
        trace!("Read event ending on line {}: {event:?}", self.line_nr);
        Ok(event)
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<EventRecord, EventReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event()
    }
}

/// Failure to open an event source
///
/// `Open`, `UnsupportedUrl`, `Io`, and `Empty` mean that the source
/// itself is unusable. `NoHeader` and `TreeNotFound` mean that it
/// does not contain the expected event collection.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("Failed to open {path:?}: {err}")]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("Unsupported event source `{0}`: only local files can be read")]
    UnsupportedUrl(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Event source is empty")]
    Empty,
    #[error("Expected collection header `T <name>` in line {line}, found `{record}`")]
    NoHeader { line: usize, record: String },
    #[error("Collection '{expected}' not found, event source contains '{found}'")]
    TreeNotFound { expected: String, found: String },
}

/// Failure to read the next event
#[derive(Debug, Error)]
pub enum EventReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse line {line} `{record}`: {msg}")]
    Parse {
        line: usize,
        record: String,
        msg: String,
    },
    #[error("Event ending on line {line} is truncated: expected {expected} photons")]
    Truncated { line: usize, expected: u32 },
}

type ParseResult<'a, T> = Result<T, nom::Err<nom::error::Error<&'a str>>>;

fn parse_header_line(record: &str) -> ParseResult<'_, &str> {
    let rest = record
        .strip_prefix('T')
        .ok_or_else(|| bad_record_start(record))?;
    let (rest, name) = any_entry(rest)?;
    line_end(rest)?;
    Ok(name)
}

fn parse_event_line(record: &str) -> ParseResult<'_, (bool, u32)> {
    let rest = record
        .strip_prefix('E')
        .ok_or_else(|| bad_record_start(record))?;
    let (rest, trigger) = flag_entry(rest)?;
    let (rest, nphotons) = u32_entry(rest)?;
    line_end(rest)?;
    Ok((trigger, nphotons))
}

fn parse_photon_line(record: &str) -> ParseResult<'_, Photon> {
    let rest = record
        .strip_prefix('P')
        .ok_or_else(|| bad_record_start(record))?;
    let (rest, is_tight_id) = flag_entry(rest)?;
    let (rest, pt) = double_entry(rest)?;
    let (rest, eta) = double_entry(rest)?;
    let (rest, phi) = double_entry(rest)?;
    let (rest, e) = double_entry(rest)?;
    let (rest, ptcone30) = double_entry(rest)?;
    let (rest, etcone20) = double_entry(rest)?;
    line_end(rest)?;
    Ok(Photon {
        is_tight_id,
        pt,
        eta,
        phi,
        e,
        ptcone30,
        etcone20,
    })
}

fn bad_record_start(record: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(
        record,
        nom::error::ErrorKind::Char,
    ))
}
