use crate::ui;
use anyhow::Result;
use std::path::PathBuf;
use ucdn_config::parse_config_from_file;

pub async fn execute(config_file: PathBuf) -> Result<()> {
    ui::print_header("Validating Exporter Config");
    println!("File: {}", config_file.display());

    match parse_config_from_file(&config_file).await {
        Ok(config) => {
            println!();
            ui::print_success("Config is valid!");
            println!("\nExporter Details:");
            println!("  Listen: {}{}", config.listen_address, config.metrics_path);
            println!("  Project: {}", config.project_id);
            println!("  API: {}", config.credentials.base_url);
            println!(
                "  Window: {:?} ending {:?} ago",
                config.window.range, config.window.delay
            );
            println!("  Concurrency: {}", config.concurrency);
            println!("  Request Timeout: {:?}", config.request_timeout);

            if config.domains.is_empty() {
                println!("  Domains: discovered at startup");
            } else {
                println!("  Domains: {}", config.domains.len());
                for (i, domain) in config.domains.iter().enumerate() {
                    println!("    {}: {} ({})", i + 1, domain.name, domain.id);
                }
            }

            if !config.credentials.is_complete() {
                println!();
                ui::print_warning(
                    "Credentials not set in file; supply UCLOUD_PUBLIC_KEY/UCLOUD_PRIVATE_KEY when serving",
                );
            }

            Ok(())
        }
        Err(e) => {
            println!();
            ui::print_error("Config is invalid!");
            println!("\nError: {:#}", e);
            Err(e)
        }
    }
}
