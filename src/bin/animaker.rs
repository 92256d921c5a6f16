//! CLI for Animaker - anime video generation with Veo.

use animaker::video::{
    AspectRatio, GeminiVideoService, GeneratedVideo, ProgressSink, Resolution, VeoModel, VideoGenerationRequest,
    VideoGenerator, DEFAULT_PROMPT,
};
use animaker::{
    CredentialProvider, EnvCredentials, FailureKind, PromptCredentials, StaticCredentials, Studio,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "animaker")]
#[command(about = "Generate anime videos from text prompts with Google Veo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video from a text prompt
    Generate(GenerateArgs),

    /// List available Veo models
    Models,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the scene (a neon-city lofi scene if omitted)
    prompt: Option<String>,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Model variant
    #[arg(short, long, value_enum, default_value = "fast")]
    model: ModelArg,

    /// Aspect ratio
    #[arg(long, value_enum, default_value = "16:9")]
    aspect_ratio: AspectRatioArg,

    /// Resolution
    #[arg(long, value_enum, default_value = "720p")]
    resolution: ResolutionArg,

    /// API key (otherwise GOOGLE_API_KEY or API_KEY, or asked for on the terminal)
    #[arg(long)]
    api_key: Option<String>,

    /// Never ask for an API key interactively
    #[arg(long)]
    no_key_prompt: bool,

    /// Seconds between status checks
    #[arg(long, default_value_t = 10)]
    poll_interval_secs: u64,

    /// Override the Gemini API root
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Fast,
    Hq,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResolutionArg {
    #[value(name = "720p")]
    Hd720,
    #[value(name = "1080p")]
    Hd1080,
}

impl From<ModelArg> for VeoModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Fast => VeoModel::Fast,
            ModelArg::Hq => VeoModel::HighQuality,
        }
    }
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
        }
    }
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Hd720 => Resolution::Hd720,
            ResolutionArg::Hd1080 => Resolution::Hd1080,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate_video(args, cli.json).await?;
        }
        Commands::Models => {
            list_models(cli.json)?;
        }
    }

    Ok(())
}

fn credentials_for(args: &GenerateArgs) -> Arc<dyn CredentialProvider> {
    if let Some(key) = &args.api_key {
        return Arc::new(StaticCredentials::new(key.clone()));
    }
    if args.no_key_prompt || !std::io::stdin().is_terminal() {
        return Arc::new(EnvCredentials);
    }
    Arc::new(PromptCredentials::from_env())
}

async fn generate_video(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let prompt = args
        .prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
    let request = VideoGenerationRequest::new(prompt)
        .with_model(args.model.into())
        .with_aspect_ratio(args.aspect_ratio.into())
        .with_resolution(args.resolution.into());

    let mut service = GeminiVideoService::builder();
    if let Some(url) = &args.base_url {
        service = service.base_url(url.clone());
    }
    let generator = VideoGenerator::builder()
        .service(service.build()?)
        .credentials(credentials_for(&args))
        .poll_interval(Duration::from_secs(args.poll_interval_secs))
        .build()?;
    let mut studio = Studio::new(generator).await;

    let progress: Arc<dyn ProgressSink> = if json_output {
        Arc::new(|msg: &str| tracing::info!("{msg}"))
    } else {
        Arc::new(|msg: &str| eprintln!("  {msg}"))
    };

    if !json_output {
        eprintln!(
            "Generating with {} via {} ({}, {})...",
            request.model.label(),
            studio.service_name(),
            request.aspect_ratio,
            request.resolution
        );
    }

    let video = run_once(&mut studio, &request, progress).await?;

    video.save(&args.output)?;

    if json_output {
        let result = serde_json::json!({
            "type": "video",
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": video.size(),
            "model": video.metadata.model,
            "aspect_ratio": video.metadata.aspect_ratio,
            "resolution": video.metadata.resolution,
            "duration_ms": video.metadata.duration_ms,
            "poll_count": video.metadata.poll_count,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated video: {} ({} bytes)",
            args.output.display(),
            video.size()
        );
        if let Some(duration) = video.metadata.duration_ms {
            println!("Generation time: {}ms", duration);
        }
    }

    Ok(())
}

/// Runs the job a single time. A credential failure leaves any newly selected key for the next run.
async fn run_once(
    studio: &mut Studio,
    request: &VideoGenerationRequest,
    progress: Arc<dyn ProgressSink>,
) -> anyhow::Result<GeneratedVideo> {
    match studio.generate(request, progress).await {
        Ok(video) => Ok(video),
        Err(failure) => {
            if failure.kind == FailureKind::Credential && studio.has_credential() {
                eprintln!(
                    "A new API key was entered. Run the command again with it \
                     (--api-key or GOOGLE_API_KEY)."
                );
            }
            Err(failure.into())
        }
    }
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModelInfo {
        name: &'static str,
        id: &'static str,
        flag: &'static str,
        default: bool,
    }

    let models: Vec<ModelInfo> = VeoModel::ALL
        .iter()
        .map(|model| ModelInfo {
            name: model.label(),
            id: model.as_str(),
            flag: match model {
                VeoModel::Fast => "fast",
                VeoModel::HighQuality => "hq",
            },
            default: *model == VeoModel::default(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("Available models:\n");
        for m in &models {
            let marker = if m.default { " (default)" } else { "" };
            println!("  {} --model {}{}", m.name, m.flag, marker);
            println!("    id: {}", m.id);
        }
        println!("\nAPI key: GOOGLE_API_KEY or API_KEY");
    }

    Ok(())
}
