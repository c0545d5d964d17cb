use anyhow::Result;
use clap::{Parser, Subcommand};
use twa_wrap::cli::{build, doctor, fingerprint, init, install, merge, update, validate};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Print debug information
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = args.command.run() {
        // The message chain is enough for the user; backtraces stay hidden.
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

#[derive(Subcommand)]
enum Commands {
    /// Create an Android project from a web app manifest
    Init {
        #[clap(flatten)]
        args: init::InitArgs,
    },
    /// Build and sign the generated project
    Build {
        #[clap(flatten)]
        args: build::BuildArgs,
    },
    /// Bump versions and regenerate the project
    Update {
        #[clap(flatten)]
        args: update::UpdateArgs,
    },
    /// Refresh the manifest from the live web manifest
    Merge {
        #[clap(flatten)]
        args: merge::MergeArgs,
    },
    /// Check the saved manifest
    Validate {
        #[clap(flatten)]
        args: validate::ValidateArgs,
    },
    /// Manage signing key fingerprints and assetlinks.json
    Fingerprint {
        #[clap(flatten)]
        args: fingerprint::FingerprintArgs,
    },
    /// Install the signed APK on a connected device
    Install {
        #[clap(flatten)]
        args: install::InstallArgs,
    },
    /// Check the configured toolchain paths
    Doctor,
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Self::Init { args } => init::run(args),
            Self::Build { args } => build::run(args),
            Self::Update { args } => update::run(args),
            Self::Merge { args } => merge::run(args),
            Self::Validate { args } => validate::run(args),
            Self::Fingerprint { args } => fingerprint::run(args),
            Self::Install { args } => install::run(args),
            Self::Doctor => doctor::run(),
        }
    }
}
