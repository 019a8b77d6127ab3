//! `carton config` command - Show resolved configuration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,
}

pub fn run(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(),
    }
}

fn run_show() -> Result<()> {
    let config = Config::load();

    println!("{}", style("Configuration").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Author:         {}", config.author());
    println!("  Editor:         {}", config.editor());
    println!(
        "  Default format: {}",
        config.default_format.as_deref().unwrap_or("auto")
    );

    Ok(())
}
