use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "dashlint")]
#[command(version, about = "Lint Grafana dashboards for invalid PromQL targets")]
pub struct CommandLineArgs {
    /// Dashboard JSON files to lint
    #[arg(value_name = "FILE", required_unless_present = "list_rules")]
    pub files: Vec<PathBuf>,

    /// Path to configuration file (defaults to config/dashlint if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log every evaluated target
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the enabled rules and exit
    #[arg(long)]
    pub list_rules: bool,
}
