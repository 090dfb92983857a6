//! Command line tracker for daily calories, protein, and miles. Every day gets one record in a
//! local key-value store; the tool keeps today's counters, rolls them over at midnight, and
//! derives weekly/monthly averages plus a history listing from the stored records.

pub mod cli;
pub mod store;
pub mod tracker;
pub mod utils;
