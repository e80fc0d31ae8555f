//!  Storage is organized through [data_store::JsonDataStore].
//!  The basic idea is:
//!   - There is a single data file with every counter, limit and the break interval.
//!   - The file is rewritten as a whole on every save. It's small, so that's cheap.
//!   - Exports are copies of the same data placed next to each other with a timestamp in the name.

pub mod data_store;
pub mod entities;
