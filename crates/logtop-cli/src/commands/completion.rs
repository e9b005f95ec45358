use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::Write;

/// Write the completion script for `shell` to `out`
pub fn execute(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let mut out = Vec::new();
        execute(Shell::Bash, &mut out).unwrap();

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("_logtop()"));
        assert!(script.contains("report"));
        assert!(script.contains("analyze"));
    }
}
