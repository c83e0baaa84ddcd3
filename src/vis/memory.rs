// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibilities kept in memory.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use hifitime::Epoch;
use log::debug;
use marlu::UVW;
use serde::{Deserialize, Serialize};

use super::{BaselineSelection, VisMeta, VisReadError, VisRecord, VisSource};
use crate::{c64, pol::write_pol};

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryVis {
    meta: VisMeta,

    /// Kept in time order.
    records: Vec<VisRecord>,
}

impl MemoryVis {
    pub fn new(meta: VisMeta) -> Result<MemoryVis, VisReadError> {
        if meta.num_chans == 0 {
            return Err(VisReadError::NoChannelsInData);
        }
        Ok(MemoryVis {
            meta,
            records: vec![],
        })
    }

    /// Add a record. Records may be added in any order; they are kept sorted
    /// by time, and records with equal times stay in the order they were
    /// added.
    pub fn push(&mut self, record: VisRecord) -> Result<(), VisReadError> {
        let expected = self.meta.num_chans;
        for (what, got) in [("values", record.data.len()), ("flags", record.flags.len())] {
            if got != expected {
                return Err(VisReadError::BadRecordLength {
                    ant1: record.ant1,
                    ant2: record.ant2,
                    what,
                    got,
                    expected,
                });
            }
        }
        let index = self
            .records
            .partition_point(|r| r.timestamp <= record.timestamp);
        self.records.insert(index, record);
        Ok(())
    }

    pub fn records(&self) -> &[VisRecord] {
        &self.records
    }

    /// Set the polarisation of these visibilities from its label (e.g. "xx").
    /// An unrecognised label is reported and nothing changes; `false` is
    /// returned.
    pub fn write_pol(&mut self, label: &str) -> bool {
        match write_pol(label) {
            Some(code) => {
                self.meta.pol_code = code;
                true
            }
            None => false,
        }
    }

    /// Read visibilities from a json dump.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<MemoryVis, VisReadError> {
        let path = path.as_ref();
        let file: VisFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let mut vis = MemoryVis::new(file.meta)?;
        for r in file.records {
            vis.push(VisRecord {
                uvw: UVW {
                    u: r.uvw[0],
                    v: r.uvw[1],
                    w: r.uvw[2],
                },
                timestamp: Epoch::from_gpst_seconds(r.gps_seconds),
                ant1: r.ant1,
                ant2: r.ant2,
                data: r.data.into_iter().map(|[re, im]| c64::new(re, im)).collect(),
                flags: r.flags,
            })?;
        }
        debug!(
            "Read {} visibility records from {}",
            vis.records.len(),
            path.display()
        );
        Ok(vis)
    }

    /// Write these visibilities as a json dump.
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<(), VisReadError> {
        let file = VisFile {
            meta: self.meta.clone(),
            records: self
                .records
                .iter()
                .map(|r| RecordFile {
                    gps_seconds: r.timestamp.to_gpst_seconds(),
                    ant1: r.ant1,
                    ant2: r.ant2,
                    uvw: [r.uvw.u, r.uvw.v, r.uvw.w],
                    data: r.data.iter().map(|d| [d.re, d.im]).collect(),
                    flags: r.flags.clone(),
                })
                .collect(),
        };
        let mut buf = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut buf, &file)?;
        buf.flush()?;
        Ok(())
    }
}

impl VisSource for MemoryVis {
    fn meta(&self) -> &VisMeta {
        &self.meta
    }

    fn read<'a>(
        &'a self,
        selection: &'a BaselineSelection,
    ) -> Box<dyn Iterator<Item = Result<VisRecord, VisReadError>> + 'a> {
        Box::new(
            self.records
                .iter()
                .filter(|r| selection.includes(r.ant1, r.ant2))
                .cloned()
                .map(Ok),
        )
    }
}

#[derive(Serialize, Deserialize)]
struct VisFile {
    meta: VisMeta,
    records: Vec<RecordFile>,
}

#[derive(Serialize, Deserialize)]
struct RecordFile {
    gps_seconds: f64,
    ant1: usize,
    ant2: usize,
    uvw: [f64; 3],
    data: Vec<[f64; 2]>,
    flags: Vec<bool>,
}
