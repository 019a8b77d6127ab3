use clap::Parser;
use miette::Result;

use carton::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    // This is standard practice for CLI tools that output to stdout.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => carton::cli::commands::init::run(args),
        Commands::Product(cmd) => carton::cli::commands::product::run(cmd, &global),
        Commands::Sku(cmd) => carton::cli::commands::sku::run(cmd, &global),
        Commands::Cache(cmd) => carton::cli::commands::cache::run(cmd, &global),
        Commands::Config(cmd) => carton::cli::commands::config::run(cmd),
        Commands::Completions(args) => carton::cli::commands::completions::run(args),
    }
}
