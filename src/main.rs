use clap::Parser;
use signature_generator::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // Ctrl-C stops the batch between rows so no file is left half-written
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, stopping after the current row...");
                    signal_token.cancel();
                }
                Err(e) => eprintln!("Failed to install CTRL+C signal handler: {}", e),
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(_summary) => {
            // Success - results have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Signature Generator - Personalized HTML Email Signatures");
    println!("========================================================");
    println!();
    println!("Fill an HTML signature template once per row of a data file and export");
    println!("the results as files, a ZIP archive or emails.");
    println!();
    println!("USAGE:");
    println!("    signature-generator <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    generate      Generate one signature per data row and export them");
    println!("    validate      Check a data file against a template");
    println!("    placeholders  List the placeholders of a template");
    println!("    test-smtp     Check the SMTP connection and credentials");
    println!("    help          Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Generate signatures into a new timestamped directory:");
    println!("    signature-generator generate -t signature.html -d staff.csv");
    println!();
    println!("    # Bundle them into an archive instead:");
    println!("    signature-generator generate -t signature.html -d staff.csv --export zip -o team.zip");
    println!();
    println!("    # Email every recipient their signature:");
    println!("    SIGGEN_SMTP_PASSWORD=... signature-generator generate -t signature.html -d staff.csv \\");
    println!("        --export email --smtp-host smtp.realdomain.com --smtp-user me@realdomain.com");
    println!();
    println!("    # Write an empty data file for a template:");
    println!("    signature-generator placeholders -t signature.html --csv-template staff.csv");
    println!();
    println!("For detailed help on any command, use:");
    println!("    signature-generator <COMMAND> --help");
}
