use crate::ui;
use anyhow::Result;
use colored::Colorize;
use ucdn_metrics::SchemaRegistry;

pub async fn execute() -> Result<()> {
    ui::print_header("Exported Metrics");

    let schema = SchemaRegistry::new();
    println!("\nTotal metrics: {}\n", schema.len());

    for descriptor in schema.descriptors() {
        println!(
            "  {} {} {{{}}}",
            "•".green(),
            descriptor.fq_name.bold(),
            descriptor.label_names.join(",")
        );
        println!("      {}", descriptor.help);
    }

    println!(
        "\n{}",
        "Run 'ucdn-exporter scrape <config>' to see current values".yellow()
    );

    Ok(())
}
