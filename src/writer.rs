use std::io::Write;

use crate::event::EventRecord;

/// Write events in the line-based text format read by
/// [Reader](crate::reader::Reader)
#[derive(Debug)]
pub struct Writer<W: Write> {
    sink: W,
}

impl<W: Write> Writer<W> {
    /// Start writing the event collection `tree` to `sink`
    pub fn new(mut sink: W, tree: &str) -> Result<Self, std::io::Error> {
        writeln!(sink, "T {tree}")?;
        Ok(Self { sink })
    }

    pub fn write(&mut self, event: &EventRecord) -> Result<(), std::io::Error> {
        writeln!(
            self.sink,
            "E {} {}",
            u8::from(event.trigger()),
            event.photon_count()
        )?;
        for p in event.photons() {
            writeln!(
                self.sink,
                "P {} {} {} {} {} {} {}",
                u8::from(p.is_tight_id),
                p.pt,
                p.eta,
                p.phi,
                p.e,
                p.ptcone30,
                p.etcone20
            )?;
        }
        Ok(())
    }

    /// Flush and return the underlying sink
    pub fn finish(mut self) -> Result<W, std::io::Error> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventBuilder, Photon};

    #[test]
    fn write() {
        let mut event = EventBuilder::new();
        event.trigger(true).add_photon(Photon {
            is_tight_id: true,
            pt: 25000.5,
            eta: -1.,
            phi: 0.25,
            e: 40000.,
            ptcone30: 0.,
            etcone20: 12.,
        });
        let mut writer = Writer::new(Vec::new(), "mini").unwrap();
        writer.write(&event.build()).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out, "T mini\nE 1 1\nP 1 25000.5 -1 0.25 40000 0 12\n");
    }
}
