mod dump;
mod list;
mod pick;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use dump::{dump, Dump};
use edjekit_pick::PickError;
use tracing::{debug, error, metadata::LevelFilter};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Subcommand)]
enum Command {
    /// Pick groups out of layout archives and merge them into a new archive.
    ///
    /// Arguments:
    ///
    ///   -i, --input <file>    Source archive for the following -g arguments.
    ///   -g, --group <group>   Include a group of the last -i archive. May be repeated.
    ///   -a, --all <file>      Include every group of an archive.
    ///   -o, --output <file>   Archive to write. Required.
    ///   --dedupe              Store resources with identical content only once.
    ///   --compression <kind>  none, zlib (default), or lzo.
    ///   -n, --dry-run         Check the request without writing anything.
    ///
    /// Groups are written together with every group they depend on and every image, sample, and
    /// font they use.
    #[clap(verbatim_doc_comment)]
    Pick {
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// List the groups in layout archives.
    List(list::Args),

    /// Read data from an archive.
    Dump {
        /// Archive to read from.
        filename: PathBuf,

        /// Which part to dump into stdout.
        #[clap(subcommand)]
        what: Dump,
    },
}

#[derive(Parser)]
#[clap(version)]
struct Args {
    /// Log what is being done.
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Tool to run.
    #[clap(subcommand)]
    command: Command,
}

fn fallible_main(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Pick { tokens } => pick::pick(tokens)?,
        Command::List(args) => list::list(args)?,
        Command::Dump { filename, what } => dump(&filename, what)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let mut args = Args::parse();
    if let Command::Pick { tokens } = &mut args.command {
        args.verbose |= pick::take_verbose(tokens);
    }

    let default_level = if args.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        );
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("cannot set default tracing subscriber: {err}");
    }

    debug!("Edje toolkit version {}", env!("CARGO_PKG_VERSION"));

    match fallible_main(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            match err.downcast_ref::<PickError>() {
                Some(pick_error) => {
                    let status = pick_error.status();
                    error!("{status}");
                    ExitCode::from(status.exit_code())
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}
