//! Last-resort handling for failures nothing else caught.

use crate::ServerSlot;

use tracing::error;

/// Exit status used after an uncaught failure.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Close the server if it is listening and log `message`.
///
/// Returns the status the process must exit with. No attempt is made to
/// keep running.
pub fn handle_uncaught(server: &ServerSlot, message: &str) -> i32 {
    let closed = server.close_if_listening();
    error!(error = message, server_closed = closed, "exiting");
    FATAL_EXIT_CODE
}
