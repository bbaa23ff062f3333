use negprompt::config::ConstraintsConfig;
use negprompt::constraints::{ConstraintSet, PredicateConstraint};
use negprompt::error::Stage;
use negprompt::llm::ScriptedProvider;
use negprompt::prompt::{NEGATIVE_DESCRIPTION, SlotValues, TemplateCatalog};
use negprompt::refine::{Phase, run_negative_prompt_cycle};

fn scenario_parameters() -> SlotValues {
    SlotValues::new()
        .with("topic", "artificial intelligence")
        .with("style", "technical")
        .with("excluded_words", "robot, human-like, science fiction")
}

fn scenario_constraints() -> ConstraintSet {
    ConstraintSet::standard(&ConstraintsConfig {
        max_word_count: 100,
        forbidden_words: vec![
            "robot".into(),
            "human-like".into(),
            "science fiction".into(),
        ],
    })
}

#[tokio::test]
async fn analogy_in_initial_reply_drives_single_refinement() {
    let catalog = TemplateCatalog::with_builtins().unwrap();
    let template = catalog.get(NEGATIVE_DESCRIPTION).unwrap();
    let provider = ScriptedProvider::new([
        "Artificial intelligence works much like a brain, as neurons do.",
        "Artificial intelligence applies statistical models to data.",
    ]);

    let report = run_negative_prompt_cycle(
        &provider,
        template,
        &scenario_parameters(),
        &scenario_constraints(),
    )
    .await
    .unwrap();

    assert_eq!(report.attempts.len(), 2);

    let initial = &report.attempts[0];
    assert_eq!(initial.phase, Phase::Initial);
    assert_eq!(
        initial.instruction.as_str(),
        "Write a technical description of artificial intelligence. \
         Exclude: robot, human-like, science fiction."
    );
    assert_eq!(initial.evaluation.passed("no_analogies"), Some(false));

    let refined = &report.attempts[1];
    assert_eq!(refined.phase, Phase::Refined(1));
    assert_eq!(
        refined.instruction.as_str(),
        "Write a technical, concise description of artificial intelligence. \
         Exclude: robot, human-like, science fiction, like, as."
    );
    assert!(refined.evaluation.all_passed());
    assert!(report.final_passed);

    let sent = provider.received();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1], refined.instruction);
}

#[tokio::test]
async fn final_result_reflects_refined_attempt_only() {
    let catalog = TemplateCatalog::with_builtins().unwrap();
    let template = catalog.get(NEGATIVE_DESCRIPTION).unwrap();
    let provider = ScriptedProvider::new(["It thinks like us.", "It is modeled as a graph."]);

    let report = run_negative_prompt_cycle(
        &provider,
        template,
        &scenario_parameters(),
        &scenario_constraints(),
    )
    .await
    .unwrap();

    assert_eq!(report.attempts.len(), 2);
    assert!(!report.final_passed);
    assert_eq!(provider.remaining(), 0);
}

#[tokio::test]
async fn custom_constraint_participates_in_cycle() {
    let catalog = TemplateCatalog::with_builtins().unwrap();
    let template = catalog.get(NEGATIVE_DESCRIPTION).unwrap();
    let constraints = scenario_constraints().with(PredicateConstraint::new(
        "ends_with_period",
        |r| r.trim_end().ends_with('.'),
    ));
    let provider = ScriptedProvider::new(["No period here", "Now with a period."]);

    let report =
        run_negative_prompt_cycle(&provider, template, &scenario_parameters(), &constraints)
            .await
            .unwrap();

    let initial = &report.attempts[0];
    assert_eq!(initial.evaluation.len(), 4);
    assert_eq!(
        initial.evaluation.failed().collect::<Vec<_>>(),
        ["ends_with_period"]
    );
    // No offending terms: only the style is nudged.
    assert_eq!(
        report.attempts[1].parameters.get("excluded_words"),
        Some("robot, human-like, science fiction")
    );
    assert_eq!(
        report.attempts[1].parameters.get("style"),
        Some("technical, concise")
    );
    assert!(report.final_passed);
}

#[tokio::test]
async fn empty_reply_aborts_cycle_at_generate_stage() {
    let catalog = TemplateCatalog::with_builtins().unwrap();
    let template = catalog.get(NEGATIVE_DESCRIPTION).unwrap();
    let provider = ScriptedProvider::new(["   "]);

    let err = run_negative_prompt_cycle(
        &provider,
        template,
        &scenario_parameters(),
        &scenario_constraints(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.phase, Phase::Initial);
    assert_eq!(err.stage, Stage::Generate);
    assert!(err.to_string().starts_with("initial phase failed at generate stage"));
}
