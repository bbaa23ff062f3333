use negprompt::config::{ConstraintsConfig, ProviderConfig};
use negprompt::constraints::ConstraintSet;
use negprompt::error::{GenerationError, Stage, StageFailure};
use negprompt::llm::create_provider;
use negprompt::prompt::{SlotValues, Template};
use negprompt::refine::{Phase, RefinementController};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "test-model",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 6}
    }))
}

fn compatible_config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        name: "compatible".into(),
        model: "test-model".into(),
        base_url: Some(format!("{}/v1", server.uri())),
        api_key: Some("test-key".into()),
        temperature: 0.2,
        timeout_secs: 5,
    }
}

fn template() -> Template {
    Template::parse("Describe {topic} in a {style} way. Never use: {excluded_words}.").unwrap()
}

fn parameters() -> SlotValues {
    SlotValues::new()
        .with("topic", "tides")
        .with("style", "plain")
        .with("excluded_words", "moon")
}

#[tokio::test]
async fn refinement_resends_strengthened_instruction_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "Describe tides in a plain way. Never use: moon."}]
        })))
        .respond_with(chat_reply("Tides behave like breathing."))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": "Describe tides in a plain, concise way. Never use: moon, like, as."
            }]
        })))
        .respond_with(chat_reply("Sea level rises and falls twice daily."))
        .expect(1)
        .mount(&server)
        .await;

    let provider = create_provider(&compatible_config(&server)).unwrap();
    let constraints = ConstraintSet::standard(&ConstraintsConfig {
        max_word_count: 20,
        forbidden_words: vec!["moon".into()],
    });

    let report = RefinementController::new(provider.as_ref())
        .run_cycle(&template(), &parameters(), &constraints)
        .await
        .unwrap();

    assert_eq!(report.attempts.len(), 2);
    assert!(!report.attempts[0].passed());
    assert!(report.final_passed);
    assert_eq!(report.attempts[1].response.output_tokens, Some(6));
}

#[tokio::test]
async fn auth_rejection_aborts_before_refinement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key sk-abcdef123456"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = create_provider(&compatible_config(&server)).unwrap();
    let constraints = ConstraintSet::standard(&ConstraintsConfig::default());

    let err = RefinementController::new(provider.as_ref())
        .run_cycle(&template(), &parameters(), &constraints)
        .await
        .unwrap_err();

    assert_eq!(err.phase, Phase::Initial);
    assert_eq!(err.stage, Stage::Generate);
    assert_eq!(
        err.source,
        StageFailure::Generation(GenerationError::Auth {
            provider: "compatible".into()
        })
    );
    assert!(err.attempts.is_empty());
}

#[tokio::test]
async fn server_error_in_refined_phase_keeps_initial_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("Tides pull like a magnet."))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = create_provider(&compatible_config(&server)).unwrap();
    let constraints = ConstraintSet::standard(&ConstraintsConfig::default());

    let err = RefinementController::new(provider.as_ref())
        .run_cycle(&template(), &parameters(), &constraints)
        .await
        .unwrap_err();

    assert_eq!(err.phase, Phase::Refined(1));
    assert_eq!(err.completed_attempts().len(), 1);
    assert_eq!(
        err.completed_attempts()[0].response.as_str(),
        "Tides pull like a magnet."
    );
    match err.source {
        StageFailure::Generation(GenerationError::Request { status, message, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}
