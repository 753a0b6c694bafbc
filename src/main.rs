use clap::Parser;
use hedgeward::cli::{check, output, run, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Check(args) => check::execute(&args.config),
        Commands::Run(args) => run::execute(args).await,
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
