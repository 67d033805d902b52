use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

// Default value functions for serde

fn default_noise_ratio_threshold() -> f32 {
    0.40 // sentences above this learned-noise ratio are deleted
}

fn default_visual_trigger_ratio() -> f32 {
    0.10 // lower bar for sentences carrying PHOTO:/Source: markers
}

fn default_min_paragraph_len() -> usize {
    5 // paragraphs shorter than this never reach the classifier
}

fn default_semantic_threshold() -> f32 {
    0.15 // minimum positive similarity to keep a document
}

fn default_snippet_len() -> usize {
    800 // only the head of the document is embedded
}

fn default_protected_keywords() -> Vec<String> {
    // Whitelist phrases plus a handful of core topical terms; sentences
    // containing any of these are never deleted by the learned detector.
    let mut kws: Vec<String> = crate::gates::keyword::WHITELIST_PHRASES
        .iter()
        .map(|p| p.to_string())
        .collect();
    kws.extend(
        [
            "modernization",
            "modernisation",
            "bilateral",
            "summit",
            "relations",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    let unique: BTreeSet<String> = kws.into_iter().filter(|k| k.len() > 2).collect();
    unique.into_iter().collect()
}

/// Tuning knobs for the cleaning core. The thresholds are empirically tuned
/// behavioral constants inherited from the production pipeline; they are
/// configurable but the defaults must not be re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    #[serde(default = "default_noise_ratio_threshold")]
    pub noise_ratio_threshold: f32,
    #[serde(default = "default_visual_trigger_ratio")]
    pub visual_trigger_ratio: f32,
    #[serde(default = "default_min_paragraph_len")]
    pub min_paragraph_len: usize,
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f32,
    #[serde(default = "default_snippet_len")]
    pub snippet_len: usize,
    /// Absolute override: sentences containing any of these are always kept
    #[serde(default = "default_protected_keywords")]
    pub protected_keywords: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            noise_ratio_threshold: default_noise_ratio_threshold(),
            visual_trigger_ratio: default_visual_trigger_ratio(),
            min_paragraph_len: default_min_paragraph_len(),
            semantic_threshold: default_semantic_threshold(),
            snippet_len: default_snippet_len(),
            protected_keywords: default_protected_keywords(),
        }
    }
}

impl CleaningConfig {
    /// Load config from a YAML file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CleaningConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to defaults
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|_| {
                eprintln!("⚠️  Failed to load config from {}, using defaults", p);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

// ===== CONCEPT CONFIGURATION =====

fn default_positive_concepts() -> Vec<String> {
    [
        "Diplomacy and bilateral relations between countries",
        "Government official visits and high-level meetings",
        "Belt and Road Initiative and infrastructure projects",
        "South China Sea disputes and maritime security",
        "International trade agreements and economic cooperation",
        "Chinese state-owned enterprises investment",
        "Foreign ministry statements and embassies",
        "Political ideology and party congress",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_negative_concepts() -> Vec<String> {
    [
        "Commercial banking awards and financial performance reports",
        "Retail promotions, shopping, and restaurant food reviews",
        "Travel holiday packages and tourism advertisements",
        "Sports match results and athlete news",
        "Entertainment, celebrity gossip, and movies",
        "Routine crime reports and local accidents",
        "Stock market fluctuations and corporate shareholders meeting",
        "Art exhibitions and cultural performances tickets",
        "Newspaper publisher notes, editorial disclaimers, and advertising supplements",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Exemplar phrase lists for the semantic gate. Each side is reduced to one
/// aggregate embedding; mutating either list requires recomputing both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptConfig {
    #[serde(default = "default_positive_concepts")]
    pub positive: Vec<String>,
    #[serde(default = "default_negative_concepts")]
    pub negative: Vec<String>,
}

impl Default for ConceptConfig {
    fn default() -> Self {
        Self {
            positive: default_positive_concepts(),
            negative: default_negative_concepts(),
        }
    }
}

impl ConceptConfig {
    /// Load the concept lists from a JSON file.
    ///
    /// - Missing file: built-in defaults are used AND written to the path.
    /// - Empty or invalid file: defaults are used without rewriting the file
    ///   (the operator's broken edit is left in place for inspection).
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            println!("ℹ️  No concept config at {}, creating default.", path.display());
            let defaults = Self::default();
            if let Err(e) = defaults.save(path) {
                eprintln!("⚠️  Failed to write default concept config: {e}");
            }
            return defaults;
        }

        match fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => {
                match serde_json::from_str::<ConceptConfig>(&content) {
                    Ok(config) => {
                        println!("✅ Loaded concept config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        eprintln!("⚠️  Concept config invalid ({e}), using defaults.");
                        Self::default()
                    }
                }
            }
            Ok(_) => {
                eprintln!("⚠️  Concept config empty, using defaults.");
                Self::default()
            }
            Err(e) => {
                eprintln!("⚠️  Concept config unreadable ({e}), using defaults.");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaning_defaults_hold_the_tuned_constants() {
        let config = CleaningConfig::default();
        assert_eq!(config.noise_ratio_threshold, 0.40);
        assert_eq!(config.visual_trigger_ratio, 0.10);
        assert_eq!(config.semantic_threshold, 0.15);
        assert_eq!(config.snippet_len, 800);
        assert_eq!(config.min_paragraph_len, 5);
        assert!(config
            .protected_keywords
            .iter()
            .any(|k| k == "modernization"));
        // entries of <= 2 chars are filtered out
        assert!(config.protected_keywords.iter().all(|k| k.len() > 2));
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: CleaningConfig =
            serde_yaml::from_str("noise_ratio_threshold: 0.5\n").unwrap();
        assert_eq!(config.noise_ratio_threshold, 0.5);
        assert_eq!(config.semantic_threshold, 0.15);
        assert_eq!(config.snippet_len, 800);
    }

    #[test]
    fn missing_concept_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semantic_config.json");

        let config = ConceptConfig::load_or_create(&path);
        assert_eq!(config, ConceptConfig::default());
        assert!(path.exists(), "defaults should be persisted");

        let reloaded = ConceptConfig::load_or_create(&path);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn corrupt_concept_file_falls_back_without_rewriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semantic_config.json");
        fs::write(&path, "{ not valid json").unwrap();

        let config = ConceptConfig::load_or_create(&path);
        assert_eq!(config, ConceptConfig::default());

        // the broken file must be left untouched
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "{ not valid json");
    }
}
