// main.rs - CLI entry point

use std::path::Path;
use std::time::Instant;
use wine_enet::cli::{process_env, tracking_token, Config};
use wine_enet::experiment::load_dataset;
use wine_enet::output::load_model_dir;
use wine_enet::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }
    let args = args.merge_with_env(process_env);

    // Validate all arguments
    let settings = validate_args(&args)?;

    println!("🚀 {}", wine_enet::get_info());
    println!("🧭 MLflow Tracking URI: {}", settings.tracking_uri);

    let total_start = Instant::now();

    // Load dataset
    let dataset = match load_dataset(&settings) {
        Ok(d) => d,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    if args.dry_run {
        let (train, test) = train_test_split(&dataset, &settings.split)?;
        train.split_target(&settings.target)?;
        println!("✅ Dry run completed successfully");
        println!(
            "📊 Split: {} train rows, {} test rows, target '{}'",
            train.n_rows(),
            test.n_rows(),
            settings.target
        );
        return Ok(());
    }

    // Open tracker for the URI scheme
    let registry = TrackerRegistry::new();
    let options = TrackerOptions {
        token: tracking_token(process_env),
    };
    let tracker = registry.open(&settings.tracking_uri, &options)?;
    println!("📡 Tracker: {} ({})", tracker.name(), tracker.location());

    let summary = run_training(&settings, &dataset, tracker.as_ref())?;

    if let Some(dir) = &args.save_model {
        summary.package.save_to_dir(Path::new(dir))?;
        let reloaded = load_model_dir(Path::new(dir))?;
        if reloaded.feature_names != summary.model.feature_names
            || reloaded.coefficients.len() != summary.model.coefficients.len()
        {
            return Err(format!("Saved model in '{}' does not match the fitted model", dir));
        }
        println!("🔁 Saved model reloads with {} features", reloaded.feature_names.len());
    }

    if let Some(report_path) = &args.report {
        let report = summary.to_report(&settings, &dataset);
        write_report(report_path, settings.report_format, &report, &command_line)?;
    }

    println!(
        "\n⏱️  Total execution time: {:.2}s",
        total_start.elapsed().as_secs_f64()
    );
    println!("✅ Run {} completed", summary.run.run_id);

    Ok(())
}
