use anyhow::{Context, Result};
use clap::Parser;
use image_studio::ai::mime::extension_for_mime;
use image_studio::ai::GeminiClient;
use image_studio::app::Studio;
use image_studio::models::{Config, GeminiResult, OperationMode};
use image_studio::request::RequestBuilder;
use image_studio::{codec, prompts};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "image-studio")]
#[command(about = "Analyze, edit, or enhance an image with Gemini")]
struct CliArgs {
    /// Image file to upload (PNG, JPEG, WebP or GIF).
    #[arg(value_name = "IMAGE", required_unless_present = "suggestions")]
    image: Option<PathBuf>,

    /// Operation to run: edit, analyze or enhance.
    #[arg(short, long, default_value = "edit", value_parser = parse_mode_arg)]
    mode: OperationMode,

    /// Edit instruction or question. Ignored by enhance.
    #[arg(short, long)]
    prompt: Option<String>,

    /// Where to write an image result.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print image results as a data URL instead of writing a file.
    #[arg(long)]
    data_url: bool,

    /// List prompt suggestions for the mode and exit.
    #[arg(long)]
    suggestions: bool,
}

fn parse_mode_arg(input: &str) -> std::result::Result<OperationMode, String> {
    input.parse()
}

fn default_output_path(input: &Path, mode: OperationMode, mime_type: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let id = Uuid::new_v4().simple().to_string();
    PathBuf::from(format!(
        "{}-{}-{}.{}",
        stem,
        mode,
        &id[..8],
        extension_for_mime(mime_type)
    ))
}

async fn write_image_result(data_url: &str, args: &CliArgs, input: &Path) -> Result<PathBuf> {
    let (mime_type, bytes) = codec::decode_data_url(data_url)?;
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, args.mode, &mime_type));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed writing {}", path.display()))?;
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    if args.suggestions {
        for suggestion in prompts::suggestions(args.mode) {
            println!("{}", suggestion);
        }
        return Ok(());
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let Some(input) = args.image.clone() else {
        anyhow::bail!("an IMAGE argument is required");
    };

    let image = match codec::read_image(&input).await {
        Ok(image) => image,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let client = GeminiClient::from_config(&config);
    let mut studio = Studio::with_request_builder(
        Arc::new(client),
        RequestBuilder::from_config(&config),
    );
    studio.upload_image(image);
    studio.set_mode(args.mode);
    studio.set_prompt(args.prompt.clone().unwrap_or_default());

    info!("{}: {}", args.mode.action_label(), input.display());
    studio.submit().await;

    let state = studio.state();
    if let Some(message) = &state.last_error {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }

    match &state.last_result {
        Some(GeminiResult::Text { content }) => println!("{}", content),
        Some(GeminiResult::Image { data_url }) if args.data_url => println!("{}", data_url),
        Some(GeminiResult::Image { data_url }) => {
            let path = write_image_result(data_url, &args, &input).await?;
            info!("Saved result to {}", path.display());
            println!("{}", path.display());
        }
        None => anyhow::bail!("submission finished without a result"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_arg_valid() {
        assert_eq!(parse_mode_arg("Analyze").unwrap(), OperationMode::Analyze);
    }

    #[test]
    fn test_parse_mode_arg_invalid() {
        let err = parse_mode_arg("resize").unwrap_err();
        assert!(err.contains("edit, analyze, enhance"));
    }

    #[test]
    fn test_default_output_path_uses_stem_mode_and_mime() {
        let path = default_output_path(
            Path::new("/photos/beach.png"),
            OperationMode::Enhance,
            "image/jpeg",
        );
        let name = path.to_string_lossy();
        assert!(name.starts_with("beach-enhance-"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_cli_requires_image_unless_listing_suggestions() {
        assert!(CliArgs::try_parse_from(["image-studio"]).is_err());

        let args =
            CliArgs::try_parse_from(["image-studio", "--suggestions", "--mode", "analyze"])
                .unwrap();
        assert!(args.suggestions);
        assert_eq!(args.mode, OperationMode::Analyze);
    }
}
