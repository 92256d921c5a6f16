//! Basic video generation example.
//!
//! Run with: `cargo run --example generate_video`
//!
//! Requires `GOOGLE_API_KEY` (or `API_KEY`) environment variable.

use animaker::{AspectRatio, Resolution, VeoModel, VideoGenerationRequest, VideoGenerator};
use std::sync::Arc;

#[tokio::main]
async fn main() -> animaker::Result<()> {
    let generator = VideoGenerator::builder().build()?;

    let request =
        VideoGenerationRequest::new("A lone swordswoman on a windswept hill, cel-shaded anime")
            .with_model(VeoModel::Fast)
            .with_aspect_ratio(AspectRatio::Landscape)
            .with_resolution(Resolution::Hd720);

    println!("Generating video (this may take a few minutes)...");
    let video = generator
        .generate(&request, Arc::new(|msg: &str| println!("  {msg}")))
        .await?;

    video.save("output.mp4")?;
    println!(
        "Generated video: {} bytes after {} status checks",
        video.size(),
        video.metadata.poll_count
    );

    Ok(())
}
