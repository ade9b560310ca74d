use crate::demo::{run_assess, run_demo, run_list, AssessArgs, DemoArgs, ListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use regional_redlist::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Regional Red List Assessor",
    about = "Run regional red-list assessments from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Drive one assessment through every stage from a JSON answers file
    Assess(AssessArgs),
    /// Walk through a worked assessment and print each stage's result
    Demo(DemoArgs),
    /// List stored assessments
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Demo(args) => run_demo(args),
        Command::List(args) => run_list(args),
    }
}
