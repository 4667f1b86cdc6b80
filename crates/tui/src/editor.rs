use std::io;
use std::process::ExitStatus;

use flameview_profile::editor_command;

const FALLBACK: &str = "vi";

/// Run `$EDITOR` (or `vi`) in the foreground and wait for it.
pub fn open(file: &str, line: u32) -> io::Result<ExitStatus> {
    let editor = std::env::var("EDITOR").ok();
    tracing::info!(file, line, editor = editor.as_deref().unwrap_or(FALLBACK), "launching editor");
    editor_command(editor.as_deref(), Some(FALLBACK), file, line)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no editor to launch"))?
        .status()
}
