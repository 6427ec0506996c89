mod opt;

use crate::opt::Opt;

use std::{
    env::var_os,
    io::{stdout, Write},
    path::Path,
};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, shells::*, Generator};
use strum::{Display, EnumString};

#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    EnumString,
    ValueEnum,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "lowercase")]
enum Shell {
    Bash,
    Elvish,
    Fish,
    #[allow(clippy::enum_variant_names)]
    PowerShell,
    Zsh,
}

#[derive(Debug, Parser)]
struct ShellSelect {
    /// Shell for which to generate completions
    ///
    /// If omitted, use the login shell given by the `SHELL`
    /// environment variable
    #[clap(value_enum)]
    shell: Option<Shell>,
}

fn gen_completion<S: Copy + Generator, W: Write>(shell: S, mut to: W) {
    generate(shell, &mut Opt::command(), "diphoton", &mut to);
}

fn main() -> Result<()> {
    let shell = ShellSelect::parse()
        .shell
        .map_or_else(get_login_shell, Ok)
        .context("Failed to determine shell")?;
    eprintln!("Generating {shell} completions");
    let out = stdout();
    match shell {
        Shell::Bash => gen_completion(Bash, out.lock()),
        Shell::Elvish => gen_completion(Elvish, out.lock()),
        Shell::Fish => gen_completion(Fish, out.lock()),
        Shell::PowerShell => gen_completion(PowerShell, out.lock()),
        Shell::Zsh => gen_completion(Zsh, out.lock()),
    }
    Ok(())
}

fn get_login_shell() -> Result<Shell> {
    let Some(shell) = var_os("SHELL") else {
        bail!("SHELL is not set")
    };
    let Some(name) = Path::new(&shell).file_name().and_then(|n| n.to_str())
    else {
        bail!("Cannot determine shell name from {shell:?}")
    };
    let shell = name
        .parse()
        .with_context(|| format!("{name} is not a supported shell"))?;
    Ok(shell)
}
