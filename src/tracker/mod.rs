//! Date-keyed daily stats. [today::TodayTracker] is the single writer for the current day;
//! [aggregate] and [history] are read-only consumers of the same key space.

pub mod aggregate;
pub mod entities;
pub mod history;
pub mod keys;
pub mod today;
