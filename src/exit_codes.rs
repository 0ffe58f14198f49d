//! Exit code mapping for the `prreview` binary.

use prreview_types::error::ErrorKind;

/// Process exit codes. `SUCCESS` aside, these follow the coarse error
/// taxonomy rather than one code per error variant.
pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const CLI_ARGS: i32 = 2;
    pub const TRANSPORT: i32 = 3;
    pub const ANALYSIS: i32 = 4;
    pub const ORCHESTRATION: i32 = 5;
    pub const PROGRAMMING: i32 = 70;
}

#[must_use]
pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Transport | ErrorKind::Protocol => codes::TRANSPORT,
        ErrorKind::Parse | ErrorKind::Validation | ErrorKind::Analysis => codes::ANALYSIS,
        ErrorKind::Orchestration => codes::ORCHESTRATION,
        ErrorKind::Programming => codes::PROGRAMMING,
    }
}
