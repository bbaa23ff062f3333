use negprompt::config::Config;
use negprompt::constraints::{ConstraintSet, evaluate};
use negprompt::error::ConfigError;
use negprompt::refine::RefinementPolicy;
use std::fs;
use tempfile::TempDir;

#[test]
fn config_file_drives_constraints_and_policy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[provider]
name = "ollama"
model = "llama3"

[constraints]
max_word_count = 5
forbidden_words = ["robot", "science fiction"]

[refinement]
stylistic_qualifier = "brief"
max_refinement_attempts = 0
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    config.validate().unwrap();

    let set = ConstraintSet::standard(&config.constraints);
    let result = evaluate("Science fiction robots walk among us today.", &set).unwrap();
    assert_eq!(result.passed("word_count"), Some(false));
    assert_eq!(result.passed("no_excluded_words"), Some(false));
    assert_eq!(
        result
            .verdict("no_excluded_words")
            .unwrap()
            .offending_terms,
        ["robot", "science fiction"]
    );

    let policy = RefinementPolicy::from(&config.refinement);
    assert_eq!(policy.stylistic_qualifier, "brief");
    assert_eq!(policy.max_refinement_attempts, 0);
}

#[test]
fn invalid_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[provider]
temperature = 3.5
"#,
    )
    .unwrap();

    let err = Config::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn saved_defaults_load_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    Config::default().save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.constraints, Config::default().constraints);
    assert_eq!(loaded.refinement, Config::default().refinement);
}
