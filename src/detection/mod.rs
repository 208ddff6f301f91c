//! Low-level probing helpers.
//!
//! - `run_script`: run an executable with an inline script under a timeout
//! - `parse_version` / `parse_pointer_bits`: interpret probe output
//! - `find_file`, `normalize_path`, `is_same_path`: filesystem lookups

mod parser;
mod path_finder;
mod process;

pub(crate) use parser::{first_line, parse_pointer_bits, parse_version};
pub(crate) use path_finder::{find_file, is_same_path, normalize_path, subdirectories};
pub(crate) use process::run_script;
