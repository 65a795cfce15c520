//! Vignette CLI binary.
//!
//! This binary provides command-line access to Vignette's functionality:
//! - Extract scenes and the persona name from a model reply
//! - Generate images and clips for those scenes through Runway
//! - Inspect, export and import the local history

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, GenerateOptions, generate_scenes, handle_history_command, init_tracing,
        parse_reply,
    };

    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json);

    let data_dir = cli.data_dir();
    let config = cli.load_config()?;

    // Execute the requested command
    match cli.command {
        Commands::Parse { file } => {
            parse_reply(&file).await?;
        }

        Commands::Generate {
            file,
            persona,
            conversation,
            sse,
        } => {
            let options = GenerateOptions::new(persona, conversation, sse);
            generate_scenes(&file, options, &config, &data_dir).await?;
        }

        Commands::History(history_cmd) => {
            handle_history_command(history_cmd, &config, &data_dir).await?;
        }
    }

    Ok(())
}
