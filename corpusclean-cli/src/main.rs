use anyhow::Result;
use clap::Parser;
use std::path::Path;

use corpusclean_core::{CleaningConfig, ConceptConfig, CorpusPipeline, ScoringServices};

#[derive(Parser)]
#[command(name = "corpusclean")]
#[command(about = "Clean scraped newswire corpora and gate them for topical relevance")]
struct Args {
    /// Directory of input .txt documents (one folder per collection)
    #[arg(short, long)]
    input: String,

    /// Recurse into subfolders, processing each as its own collection
    #[arg(short, long)]
    recursive: bool,

    /// Path to the semantic concept config (created with defaults if missing)
    #[arg(long, default_value = "semantic_config.json")]
    concepts: String,

    /// Path to custom cleaning config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Base URL of the scoring server (token classifier + embedder).
    /// Omitted: run degraded (no learned noise spans, semantic gate fails closed)
    #[arg(long)]
    scoring_url: Option<String>,

    /// Override the semantic similarity threshold from the config
    #[arg(long)]
    threshold: Option<f32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🧽 Corpusclean Newswire Cleaner");

    if !Path::new(&args.input).is_dir() {
        println!("⚠️  Input directory not found at: {}", args.input);
        println!("   Please check the path.");
        return Ok(());
    }

    let mut config = CleaningConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }
    if let Some(t) = args.threshold {
        config.semantic_threshold = t;
        println!("🎚️  Semantic threshold overridden: {t}");
    }

    let concepts = ConceptConfig::load_or_create(Path::new(&args.concepts));
    println!(
        "🧠 Concepts: {} positive / {} negative ({})",
        concepts.positive.len(),
        concepts.negative.len(),
        args.concepts
    );

    let services = create_services(&args);
    let mut pipeline = CorpusPipeline::new(services, concepts, config);

    println!("📄 Processing: {}", args.input);

    let mut progress = |count: usize, total: usize, msg: &str| {
        println!("   [{count}/{total}] {msg}");
    };
    let result = pipeline.process_folder(
        Path::new(&args.input),
        args.recursive,
        Some(&mut progress),
    );

    pipeline.release();

    match result {
        Ok(summary) => {
            println!("✅ Run complete");
            println!("📊 Summary:");
            println!("   - Total documents:    {}", summary.total);
            println!("   - Kept:               {}", summary.kept);
            println!("   - Rejected (keyword): {}", summary.rejected_keyword);
            println!("   - Rejected (semantic):{}", summary.rejected_semantic);
            println!("   - Skipped:            {}", summary.skipped);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Run failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Wire up the scoring backend from CLI flags
#[cfg(feature = "http-backend")]
fn create_services(args: &Args) -> ScoringServices {
    use corpusclean_core::{HttpEmbedder, HttpTokenClassifier};

    match &args.scoring_url {
        Some(url) => {
            println!("🚀 Using scoring server at {url}");
            ScoringServices::new(
                Some(Box::new(HttpTokenClassifier::new(url))),
                Some(Box::new(HttpEmbedder::new(url))),
            )
        }
        None => {
            println!("⚠️  No --scoring-url given: learned noise detection is off and the semantic gate will reject everything");
            ScoringServices::degraded()
        }
    }
}

/// Fallback when no backend is compiled in
#[cfg(not(feature = "http-backend"))]
fn create_services(_args: &Args) -> ScoringServices {
    println!("⚠️  Built without a scoring backend: running degraded");
    ScoringServices::degraded()
}
