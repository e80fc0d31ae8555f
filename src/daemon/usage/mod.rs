//! In-memory bookkeeping of usage. Nothing here touches the OS or the disk, the collector
//! feeds samples in and the presentation reads totals out.

pub mod accumulator;
pub mod limits;
