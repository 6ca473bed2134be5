use anyhow::Result;
use clap::Parser;
use npx_import::runtime::Runtime;
use npx_import::{
    ImportConfig, ImportError, Logger, ModuleLoader, NpxImporter, SilentLogger, StdoutLogger,
};
use std::path::PathBuf;

/// npx-import - use npm packages without installing them first
///
/// Packages already resolvable from the working directory are used as-is.
/// Missing ones are installed temporarily with a single npx call.
///
/// Examples:
///   npx-import import left-pad             # Resolve left-pad, installing it if needed
///   npx-import import left-pad@1.3.0 is-odd  # Several packages, one npx call
#[derive(Parser, Debug)]
#[command(author, version = env!("NPXI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// npx command to install packages with
    #[arg(long, env = "NPXI_NPX", default_value = "npx", global = true)]
    pub npx: String,

    /// node command used inside the npx environment
    #[arg(long, env = "NPXI_NODE", default_value = "node", global = true)]
    pub node: String,

    /// Directory local packages are resolved from (defaults to the current directory)
    #[arg(long, env = "NPXI_CWD", value_name = "PATH", global = true)]
    pub cwd: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Import packages and print where each one resolved to
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Package specifiers, e.g. "left-pad", "left-pad@1.3.0" or "@scope/pkg@next/sub/path"
    #[arg(value_name = "SPEC", required = true)]
    pub specs: Vec<String>,

    /// Print each package's path as resolved after the import
    #[arg(long)]
    pub paths: bool,

    /// Do not print progress messages
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    fn config(&self) -> ImportConfig {
        let config = ImportConfig::default()
            .with_npx(&self.npx)
            .with_node(&self.node);
        match &self.cwd {
            Some(cwd) => config.with_working_dir(cwd),
            None => config,
        }
    }
}

async fn run_import<R: Runtime, L: ModuleLoader>(
    importer: &NpxImporter<R, L>,
    args: &ImportArgs,
) -> Result<()> {
    let logger: Box<dyn Logger> = if args.quiet {
        Box::new(SilentLogger)
    } else {
        Box::new(StdoutLogger::default())
    };

    let modules = importer
        .import_with_logger(args.specs.clone(), logger.as_ref())
        .await?
        .into_vec();

    for (spec, module) in args.specs.iter().zip(modules) {
        let path = if args.paths {
            match importer.resolve_path(spec) {
                Ok(path) => path,
                // Nothing had to be installed, so nothing was recorded
                Err(ImportError::ResolveBeforeImport { .. }) => module.entry,
                Err(e) => return Err(e.into()),
            }
        } else {
            module.entry
        };
        println!(
            "{} {} {}",
            module.specifier,
            module.version.as_deref().unwrap_or("-"),
            path.display()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let importer = NpxImporter::with_config(cli.config());

    let result = match &cli.command {
        Commands::Import(args) => run_import(&importer, args).await,
    };
    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Exit code for a failed run: 2 when the specifiers themselves were rejected.
fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ImportError>() {
        Some(e) if e.is_validation() => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_import_parsing() {
        let cli = Cli::try_parse_from(["npx-import", "import", "left-pad"]).unwrap();
        match &cli.command {
            Commands::Import(args) => {
                assert_eq!(args.specs, vec!["left-pad"]);
                assert!(!args.paths);
                assert!(!args.quiet);
            }
        }
        assert_eq!(cli.cwd, None);
    }

    #[test]
    fn test_cli_multiple_specs_and_flags() {
        let cli = Cli::try_parse_from([
            "npx-import",
            "import",
            "left-pad@1.3.0",
            "@scope/pkg/sub",
            "--paths",
            "-q",
        ])
        .unwrap();
        match &cli.command {
            Commands::Import(args) => {
                assert_eq!(args.specs, vec!["left-pad@1.3.0", "@scope/pkg/sub"]);
                assert!(args.paths);
                assert!(args.quiet);
            }
        }
    }

    #[test]
    fn test_cli_global_options_build_config() {
        let cli = Cli::try_parse_from([
            "npx-import",
            "--npx",
            "/opt/node/bin/npx",
            "import",
            "left-pad",
            "--cwd",
            "/srv/app",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.npx, "/opt/node/bin/npx");
        assert_eq!(config.node, "node");
        assert_eq!(config.working_dir, Some(PathBuf::from("/srv/app")));
    }

    #[test]
    fn test_exit_code_separates_rejected_specifiers() {
        let rejected = anyhow::Error::from(ImportError::CoreModuleNotImportable {
            name: "fs".to_string(),
        });
        assert_eq!(exit_code(&rejected), 2);

        let failed = anyhow::Error::from(ImportError::ToolUnavailable {
            command: "npx --version".to_string(),
            output: "not found".to_string(),
        });
        assert_eq!(exit_code(&failed), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn test_cli_requires_a_spec() {
        assert!(Cli::try_parse_from(["npx-import", "import"]).is_err());
        assert!(Cli::try_parse_from(["npx-import", "left-pad"]).is_err());
    }
}
