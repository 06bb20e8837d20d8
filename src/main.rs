use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use meal_photo_analyzer::models::MealImage;
use meal_photo_analyzer::services::{
    format_analysis_report, AnalysisOrchestrator, CloudVisionService, DeviceSidecarService,
    SidecarHealthProbe,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting meal photo analyzer...");

    let mut args = env::args().skip(1);
    let image_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: meal-photo-analyzer <image-path> [auto|cloud|device]");
            std::process::exit(2);
        }
    };
    let preference = args.next().unwrap_or_else(|| "auto".to_string());

    // Load configuration. The API key is optional on purpose: without it the
    // cloud adapter reports a configuration failure and routing moves on.
    let openrouter_api_key = env::var("OPENROUTER_API_KEY").ok();
    if openrouter_api_key.is_none() {
        log::warn!("⚠️ OPENROUTER_API_KEY not set, cloud analysis will be unavailable");
    }

    let openrouter_model = env::var("OPENROUTER_MODEL")
        .unwrap_or_else(|_| "meta-llama/llama-4-scout:free".to_string());

    let sidecar_url = env::var("SIDECAR_URL").unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());

    let cloud = Arc::new(CloudVisionService::new(openrouter_api_key, openrouter_model.clone()));
    log::info!("✅ Cloud vision service initialized with model: {}", openrouter_model);

    let probe = Arc::new(SidecarHealthProbe::new(sidecar_url.clone()));
    let device = Arc::new(DeviceSidecarService::new(sidecar_url.clone(), probe));
    log::info!("✅ Device sidecar service initialized at: {}", sidecar_url);

    let orchestrator = AnalysisOrchestrator::new(cloud, device);

    let image = MealImage::from_path(&image_path)?;
    log::info!("📸 Analyzing {} ({} bytes, preference: {})", image_path, image.bytes.len(), preference);

    let analysis = orchestrator.analyze(&image, &preference).await;

    println!("\n{}\n", format_analysis_report(&analysis));

    Ok(())
}
