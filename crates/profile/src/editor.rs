use std::process::Command;

/// `$EDITOR +line file`. A blank or missing `editor` uses `fallback`, and
/// with no fallback there is nothing to run. The editor value may carry its
/// own arguments (`code --wait`).
pub fn editor_command(
    editor: Option<&str>,
    fallback: Option<&str>,
    file: &str,
    line: u32,
) -> Option<Command> {
    let editor = editor
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .or(fallback)?;
    let mut parts = editor.split_whitespace();
    let mut cmd = Command::new(parts.next()?);
    cmd.args(parts);
    if line > 0 {
        cmd.arg(format!("+{line}"));
    }
    cmd.arg(file);
    Some(cmd)
}
