use std::io::{self, Write as _};

use anyhow::Context;
use serde::Serialize;

/// Writes `value` to stdout as pretty-printed JSON followed by a newline.
pub fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)
        .context("Failed to write JSON to stdout")?;
    writeln!(stdout).context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}
