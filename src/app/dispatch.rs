use crate::cli::commands::{Cli, Commands, ConfigCommands, ConstraintArgs, PromptArgs};
use anyhow::{Context as _, Result, bail};
use negprompt::config::{Config, ConstraintsConfig};
use negprompt::constraints::{ConstraintSet, evaluate};
use negprompt::error::{NegPromptError, TemplateError};
use negprompt::llm::{Provider, ScriptedProvider, create_provider};
use negprompt::prompt::{SlotValues, Template, TemplateCatalog};
use negprompt::refine::{CycleReport, RefinementController, RefinementPolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// Exit status when the final attempt still violates a constraint.
const CONSTRAINTS_FAILED: u8 = 2;

/// Config is loaded per command so `config init` never reads the file it
/// is about to replace.
pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config_file = cli.config_file;
    let load = || Config::load_or_default(config_file.as_deref());

    match cli.command {
        Commands::Run {
            prompt,
            constraints,
            qualifier,
            max_refinements,
            scripted,
            json,
        } => {
            let config = load()?;
            let mut policy = RefinementPolicy::from(&config.refinement);
            if let Some(qualifier) = qualifier {
                policy = policy.with_stylistic_qualifier(qualifier.trim());
            }
            if let Some(max) = max_refinements {
                policy = policy.with_max_refinement_attempts(max);
            }
            run_cycle(&config, &prompt, &constraints, policy, scripted, json)
                .await
                .map(exit_status)
        }
        Commands::Render { prompt } => {
            let config = load()?;
            let catalog = TemplateCatalog::with_builtins()?;
            let template = select_template(&catalog, &prompt)?;
            let instruction = template.render(&build_parameters(&prompt, &config.constraints))?;
            println!("{instruction}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            response,
            constraints,
            json,
        } => check_response(&load()?, &response, &constraints, json).map(exit_status),
        Commands::Templates => {
            let catalog = TemplateCatalog::with_builtins()?;
            for (name, template) in catalog.iter() {
                println!("{name}  [{}]", template.slots().join(", "));
                for line in template.pattern().lines() {
                    println!("    {line}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { config_command } => match config_command {
            ConfigCommands::Show => {
                let mut shown = load()?;
                if shown.provider.api_key.is_some() {
                    shown.provider.api_key = Some("***".into());
                }
                print!("{}", toml::to_string_pretty(&shown)?);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCommands::Init { force } => {
                let path = init_config(config_file.clone(), force)?;
                println!("Wrote {}", path.display());
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

/// Write a default config to `path` (or the default location). An existing
/// file is only replaced with `force`, whatever its contents.
fn init_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let Some(path) = path.or_else(Config::default_path) else {
        bail!("could not determine a home directory; pass --config <PATH>");
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save(&path)?;
    Ok(path)
}

async fn run_cycle(
    config: &Config,
    prompt: &PromptArgs,
    constraint_args: &ConstraintArgs,
    policy: RefinementPolicy,
    scripted: Vec<String>,
    json: bool,
) -> Result<bool> {
    let catalog = TemplateCatalog::with_builtins()?;
    let template = select_template(&catalog, prompt)?;
    let constraints_config = merge_constraints(&config.constraints, constraint_args, &prompt.exclude);
    let constraints = ConstraintSet::standard(&constraints_config);
    let parameters = build_parameters(prompt, &constraints_config);

    let provider: Box<dyn Provider> = if scripted.is_empty() {
        create_provider(&config.provider)?
    } else {
        Box::new(ScriptedProvider::new(scripted))
    };
    if let Err(e) = provider.warmup().await {
        warn!(provider = provider.name(), error = %e, "provider warmup failed");
    }
    info!(
        provider = provider.name(),
        max_refinements = policy.max_refinement_attempts,
        "run.start"
    );

    let controller = RefinementController::new(provider.as_ref()).with_policy(policy);
    match controller.run_cycle(&template, &parameters, &constraints).await {
        Ok(report) => {
            print_report(&report, json)?;
            Ok(report.final_passed)
        }
        Err(err) => {
            if !err.completed_attempts().is_empty() {
                let partial = CycleReport::new(err.completed_attempts().to_vec());
                eprintln!("Completed attempts before the failure:");
                eprintln!("{}", partial.render_text_summary());
            }
            Err(NegPromptError::from(Box::new(err)).into())
        }
    }
}

fn check_response(
    config: &Config,
    response: &str,
    constraint_args: &ConstraintArgs,
    json: bool,
) -> Result<bool> {
    let constraints_config = merge_constraints(&config.constraints, constraint_args, &[]);
    let constraints = ConstraintSet::standard(&constraints_config);
    let evaluation = evaluate(response, &constraints)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "passed": evaluation.all_passed(),
                "constraints": evaluation,
            }))?
        );
    } else {
        for (name, verdict) in evaluation.iter() {
            let status = if verdict.passed { "pass" } else { "fail" };
            if verdict.offending_terms.is_empty() {
                println!("{name}: {status}");
            } else {
                println!("{name}: {status} ({})", verdict.offending_terms.join(", "));
            }
        }
    }

    Ok(evaluation.all_passed())
}

fn exit_status(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(CONSTRAINTS_FAILED)
    }
}

fn print_report(report: &CycleReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("failed to serialize report")?
        );
    } else {
        println!("{}", report.render_text_summary());
    }
    Ok(())
}

fn select_template(catalog: &TemplateCatalog, prompt: &PromptArgs) -> Result<Template> {
    if let Some(pattern) = &prompt.pattern {
        return Ok(Template::parse(pattern.as_str())?);
    }
    catalog
        .get(&prompt.template)
        .cloned()
        .ok_or_else(|| {
            TemplateError::UnknownTemplate {
                name: prompt.template.clone(),
            }
            .into()
        })
}

/// Slot values for a prompt: `topic`, `style`, `excluded_words` (the
/// `--exclude` list, else the forbidden words), then any `--set` pairs.
fn build_parameters(prompt: &PromptArgs, constraints: &ConstraintsConfig) -> SlotValues {
    let excluded = if prompt.exclude.is_empty() {
        constraints.forbidden_words.join(", ")
    } else {
        prompt.exclude.join(", ")
    };

    let mut parameters = SlotValues::new()
        .with("topic", &prompt.topic)
        .with("style", &prompt.style)
        .with("excluded_words", excluded);
    for (slot, value) in &prompt.set {
        parameters.insert(slot.as_str(), value);
    }
    parameters
}

/// Config constraints plus command-line additions. Words the instruction
/// excludes are also checked in the response.
fn merge_constraints(
    base: &ConstraintsConfig,
    args: &ConstraintArgs,
    excluded: &[String],
) -> ConstraintsConfig {
    let mut merged = base.clone();
    if let Some(max) = args.max_words {
        merged.max_word_count = max;
    }
    for word in args.forbid.iter().chain(excluded).map(|w| w.trim()) {
        let lowered = word.to_lowercase();
        if !word.is_empty()
            && !merged
                .forbidden_words
                .iter()
                .any(|existing| existing.to_lowercase() == lowered)
        {
            merged.forbidden_words.push(word.to_string());
        }
    }
    merged
}
