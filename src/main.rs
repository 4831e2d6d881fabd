mod cli;

use clap::Parser;

use cli::commands::log::LogQuery;
use cli::commands::tap::TapOptions;
use cli::{Cli, Commands, context};

fn main() {
    let args = Cli::parse();

    context::init(args.config.as_deref());
    context::init_tracing(args.verbose);
    let loggable_dir = context::loggable_dir();

    let result = match &args.command {
        Commands::Init => cli::commands::init::execute(loggable_dir),
        Commands::Tap {
            file,
            dry_run,
            testing,
            causer,
            strict,
            json,
        } => cli::commands::tap::execute(
            loggable_dir,
            file,
            causer.as_deref(),
            TapOptions {
                dry_run: *dry_run,
                testing: *testing,
                strict: *strict,
                json: *json,
            },
        ),
        Commands::Log {
            log_name,
            subject,
            causer,
            since,
            last,
            json,
        } => cli::commands::log::execute(
            loggable_dir,
            &LogQuery {
                log_name: log_name.as_deref(),
                subject: subject.as_deref(),
                causer: causer.as_deref(),
                since: since.as_deref(),
                last: *last,
                json: *json,
            },
        ),
        Commands::Prune { older_than, force } => {
            cli::commands::prune::execute(loggable_dir, *older_than, *force)
        }
        Commands::Status => cli::commands::status::execute(loggable_dir),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
