use crate::report::{run_inventory_report, run_patient_import, ImportPatientsArgs, InventoryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kura_workspace::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KURA Workspace",
    about = "Run the KURA laboratory workspace API or its offline tools",
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
    /// Import patients from a CSV export and print the import summary
    ImportPatients(ImportPatientsArgs),
    /// Print current stock levels, most urgent first
    Inventory(InventoryArgs),
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
        Command::ImportPatients(args) => run_patient_import(args),
        Command::Inventory(args) => run_inventory_report(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kura_workspace::lab::patients::PatientField;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["kura-workspace-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn import_collects_repeated_mappings() {
        let cli = Cli::try_parse_from([
            "kura-workspace-api",
            "import-patients",
            "--file",
            "pacientes.csv",
            "--mapping",
            "Cédula=documentId",
            "--mapping",
            "Cliente=fullName",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::ImportPatients(args)) => {
                assert_eq!(args.file.to_string_lossy(), "pacientes.csv");
                assert_eq!(
                    args.mapping,
                    vec![
                        ("Cédula".to_string(), PatientField::DocumentId),
                        ("Cliente".to_string(), PatientField::FullName),
                    ]
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["kura-workspace-api", "serve", "--port", "8081"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8081));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
