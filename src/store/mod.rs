//! The persistent key-value map backing the tracker. [kv::KvStore] is the contract everything
//! else is written against; [file::FileKvStore] is the on-disk realization.

pub mod file;
pub mod kv;
