//! Runtime plumbing shared by Pulp server crates: the logging subsystem.

pub mod logs;
