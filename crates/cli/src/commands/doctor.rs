//! `mindmate doctor` — Diagnose config and backend health.

use mindmate_config::AppConfig;
use mindmate_core::CompletionClient;
use mindmate_providers::OllamaClient;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("MindMate Doctor");
    println!("===============\n");

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("[ok] Config loaded");
            config
        }
        Err(e) => {
            println!("[!!] Config failed to load: {e}");
            return Ok(());
        }
    };

    println!("     Inference: {} ({})", config.inference.host, config.inference.model);
    println!("     Memory:    {}", config.storage.path.display());

    let client = OllamaClient::new(&config.inference);
    match client.health_check().await {
        Ok(true) => println!("[ok] Ollama reachable"),
        Ok(false) => println!("[!!] Ollama responded with an error status"),
        Err(e) => println!("[!!] Ollama unreachable: {e}"),
    }

    Ok(())
}
