use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use timeliness::config::cli::CliArgs;
use timeliness::config::toml_config::RulesConfig;
use timeliness::core::evaluator::ValidationReport;
use timeliness::utils::error::TimelinessError;
use timeliness::utils::{logger, validation::Validate};
use timeliness::{JsonRecord, Translator};

#[derive(Serialize)]
struct RecordReport {
    index: usize,
    valid: bool,
    errors: Vec<String>,
    attributes: Vec<ValidationReport>,
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting timeliness-check");
    tracing::info!("📁 Loading rules from: {}", args.config);

    let config = match load_rules(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Rules validation failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    };

    let settings = config.settings()?.shared();
    if args.ignore_restriction_errors {
        settings.set_ignore_restriction_errors(true);
        tracing::info!("🔧 Restriction errors will be ignored");
    }

    let catalog: Arc<dyn Translator> = Arc::new(config.message_catalog()?);
    let rules = match config.rule_set(Arc::clone(&settings), catalog) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    };
    tracing::info!("✅ Loaded {} validations", rules.len());

    let content = std::fs::read_to_string(&args.records)?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&content).map_err(TimelinessError::from)?;
    tracing::info!("📂 Validating {} records from {}", records.len(), args.records);

    let mut reports = Vec::with_capacity(records.len());
    for (index, value) in records.into_iter().enumerate() {
        let mut record =
            JsonRecord::from_json(value)?.with_timezone_aware(config.timezone_aware.iter().cloned());
        let attributes = rules.validate_record(&mut record);
        reports.push(RecordReport {
            index,
            valid: record.is_valid(),
            errors: record.errors().full_messages(),
            attributes,
        });
    }

    let invalid = reports.iter().filter(|r| !r.valid).count();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in reports.iter().filter(|r| !r.valid) {
            println!("❌ record #{}", report.index);
            for message in &report.errors {
                println!("   - {}", message);
            }
        }
        println!("✅ {} valid, ❌ {} invalid", reports.len() - invalid, invalid);
    }

    tracing::info!("Finished: {} of {} records invalid", invalid, reports.len());
    if invalid > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn load_rules(path: &str) -> timeliness::Result<RulesConfig> {
    let config = RulesConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}
