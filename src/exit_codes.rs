//! Process exit codes.
//!
//! - `0` the run completed cleanly (or a read-only command succeeded)
//! - `1` the run was aborted: nothing trustworthy was produced
//! - `2` invalid command-line usage (emitted by clap)
//! - `3` the run completed but some paths failed; see the report

use crate::report::RunStatus;

pub const SUCCESS: i32 = 0;
pub const ABORTED: i32 = 1;
pub const USAGE: i32 = 2;
pub const COMPLETED_WITH_ERRORS: i32 = 3;

/// Exit code for a run that reached the end.
pub fn for_status(status: RunStatus) -> i32 {
    match status {
        RunStatus::Clean => SUCCESS,
        RunStatus::CompletedWithErrors(_) => COMPLETED_WITH_ERRORS,
    }
}
