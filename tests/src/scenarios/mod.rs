//! End-to-end broker scenarios over a file-backed runtime.

mod end_to_end;
mod properties;
