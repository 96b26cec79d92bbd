use crate::config::DEFAULT_CONFIG_PATH;
use getopts::Options;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config_path: PathBuf,
}

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Args),
    Help(String),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "c",
        "config",
        "Configuration file [Default: config.toml]",
        "PATH",
    );
    opts
}

/// Parse arguments (without the program name)
pub fn try_parse(args: &[String]) -> Result<Command, getopts::Fail> {
    let opts = opts();
    let matches = opts.parse(args)?;

    if matches.opt_present("help") {
        return Ok(Command::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let config_path = matches
        .opt_str("config")
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    Ok(Command::Run(Args {
        config_path: PathBuf::from(config_path),
    }))
}

/// Parse process arguments, exiting on `--help` or invalid input
pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args.get(1..).unwrap_or_default()) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(2);
        }
    }
}
