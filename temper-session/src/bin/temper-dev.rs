//! temper-dev: inspect characters, rules and prompts from the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use temper_core::persistence::to_json;
use temper_core::{
    CharacterRoster, Mood, MoodState, TemperConfig, assemble_instructions, match_rules,
};
use temper_llm::prompt::PromptEngine;
use temper_session::MoodClassifier;
use temper_session::prompts::reply_request;
use temper_session::providers::build_chain;

#[derive(Parser)]
#[command(name = "temper-dev")]
#[command(about = "Developer tools for temper characters and prompts", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration (defaults are used if the file is missing)
    #[arg(long, default_value = "config/temper.toml", env = "TEMPER_CONFIG")]
    config: PathBuf,

    /// Character roster
    #[arg(long, default_value = "config/characters.toml", env = "TEMPER_ROSTER")]
    roster: PathBuf,

    /// Directory of prompt TOML files (built-ins if omitted)
    #[arg(long)]
    prompts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every character in the roster
    Characters,
    /// Print a character's behavior rule table
    ListRules {
        /// Character id or name
        character: String,
    },
    /// Print the full reply prompt for a given mood, without calling a model
    ShowPrompt {
        /// Character id or name
        character: String,
        /// Mood to assume
        #[arg(long, default_value = "neutral")]
        mood: Mood,
        /// Intensity to assume
        #[arg(long, default_value_t = 0.5)]
        intensity: f32,
        /// The user's message
        #[arg(long)]
        message: String,
        /// Scenario description
        #[arg(long, default_value = "")]
        scenario: String,
        /// The character's role in the scenario
        #[arg(long, default_value = "")]
        role: String,
    },
    /// Run one live mood classification against the configured providers
    TestMood {
        /// Character id or name
        character: String,
        /// The user's message
        #[arg(long)]
        message: String,
        /// Scenario description
        #[arg(long, default_value = "")]
        scenario: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let roster = CharacterRoster::from_file(&cli.roster)
        .with_context(|| format!("loading roster {}", cli.roster.display()))?;
    let prompts = match &cli.prompts {
        Some(dir) => PromptEngine::from_directory(dir).map_err(anyhow::Error::msg)?,
        None => PromptEngine::builtin(),
    };

    match cli.command {
        Commands::Characters => {
            for persona in roster.iter() {
                println!(
                    "{:<10} {:<10} {:>2} rules  {}",
                    persona.id,
                    persona.name,
                    persona.rules.len(),
                    persona.personality_traits.join(", ")
                );
            }
        }
        Commands::ListRules { character } => {
            let persona = roster.require(&character)?;
            println!("{} ({} rules)", persona.name, persona.rules.len());
            for (i, rule) in persona.rules.rules().iter().enumerate() {
                println!(
                    "\n{}. {} >= {:.2} on [{}]",
                    i + 1,
                    rule.mood,
                    rule.intensity_threshold,
                    rule.trigger_keywords.join(", ")
                );
                for behavior in &rule.behaviors {
                    println!("   - {behavior}");
                }
            }
        }
        Commands::ShowPrompt {
            character,
            mood,
            intensity,
            message,
            scenario,
            role,
        } => {
            let persona = roster.require(&character)?;
            let state = MoodState::new(mood, intensity, "Set from the command line");
            let matches = match_rules(&state, &message, &persona.rules);
            let block = assemble_instructions(persona, &state, &matches);
            let request = reply_request(&prompts, persona, &scenario, &role, &block, &[], &message, &config.llm);
            println!("=== SYSTEM ({} rules fired) ===\n{}", matches.len(), request.system);
            println!("\n=== USER ===\n{}", request.user);
        }
        Commands::TestMood {
            character,
            message,
            scenario,
        } => {
            let persona = roster.require(&character)?;
            let chain = build_chain(&config.llm);
            if chain.is_empty() {
                bail!("no usable provider configured (check API key variables)");
            }
            let classifier = MoodClassifier::new(
                Arc::new(chain),
                Arc::new(prompts),
                config.classifier.clone(),
                config.llm.clone(),
            );
            let before = MoodState::new(
                persona.initial_mood(&scenario),
                config.session.initial_intensity,
                "Scenario start",
            );
            println!("before: {} ({:.2})", before.mood(), before.intensity());
            let after = classifier
                .classify_and_update(persona, &message, before.clone(), &[], &scenario)
                .await;
            if after == before {
                println!("classification failed, mood kept (see logs)");
            }
            println!("after:  {} ({:.2})", after.mood(), after.intensity());
            println!("reason: {}", after.reason());
            println!("record: {}", to_json(&after)?);
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<TemperConfig> {
    if path.exists() {
        TemperConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))
    } else {
        Ok(TemperConfig::default())
    }
}
