use negprompt::config::ConstraintsConfig;
use negprompt::constraints::{ConstraintSet, evaluate};
use negprompt::error::TemplateError;
use negprompt::prompt::{SlotValues, Template, render};

const PATTERNS: &[&str] = &[
    "Write a {style} description of {topic}. Exclude: {excluded_words}.",
    "{topic}",
    "Literal {{braces}} around {topic} stay put.",
    "Tera-looking text {{% raw %}} and {{# note #}} near {topic}\nsecond line: {style}\n",
    "  leading and trailing whitespace {topic}  ",
];

fn full_values(template: &Template) -> SlotValues {
    template
        .slots()
        .iter()
        .map(|slot| (slot.clone(), format!("<{slot}>")))
        .collect()
}

fn expected_text(pattern: &str, values: &SlotValues) -> String {
    let mut expected = pattern.replace("{{", "\u{0}").replace("}}", "\u{1}");
    for (slot, value) in values.iter() {
        expected = expected.replace(&format!("{{{slot}}}"), value);
    }
    expected.replace('\u{0}', "{").replace('\u{1}', "}")
}

#[test]
fn complete_values_render_every_literal_verbatim() {
    for pattern in PATTERNS {
        let template = Template::parse(*pattern).unwrap();
        let values = full_values(&template);
        let instruction = render(&template, &values).unwrap();
        assert_eq!(instruction.as_str(), expected_text(pattern, &values), "{pattern}");
    }
}

#[test]
fn incomplete_values_name_a_missing_slot() {
    for pattern in PATTERNS {
        let template = Template::parse(*pattern).unwrap();
        for omitted in template.slots() {
            let values: SlotValues = template
                .slots()
                .iter()
                .filter(|slot| *slot != omitted)
                .map(|slot| (slot.clone(), "v"))
                .collect();
            let err = render(&template, &values).unwrap_err();
            match err {
                TemplateError::MissingSlot { slot } => {
                    assert!(!values.contains(&slot), "{slot} was supplied");
                    assert_eq!(&slot, omitted);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}

#[test]
fn extra_values_are_ignored() {
    let template = Template::parse("About {topic}.").unwrap();
    let values = SlotValues::new().with("topic", "tides").with("unused", 42);
    assert_eq!(render(&template, &values).unwrap().as_str(), "About tides.");
}

#[test]
fn evaluation_has_one_entry_per_constraint_for_any_response() {
    let set = ConstraintSet::standard(&ConstraintsConfig {
        max_word_count: 3,
        forbidden_words: vec!["robot".into()],
    });
    for response in ["", " ", "robot", "like as", "one two three four five", "Likewise."] {
        let result = evaluate(response, &set).unwrap();
        assert_eq!(result.len(), set.len(), "{response:?}");
        assert!(set.names().all(|name| result.passed(name).is_some()));
    }
}

#[test]
fn canonical_predicates_match_documented_examples() {
    let set = ConstraintSet::standard(&ConstraintsConfig {
        max_word_count: 100,
        forbidden_words: vec!["robot".into()],
    });

    let exact = vec!["w"; 100].join(" ");
    let over = vec!["w"; 101].join(" ");
    assert_eq!(evaluate(&exact, &set).unwrap().passed("word_count"), Some(true));
    assert_eq!(evaluate(&over, &set).unwrap().passed("word_count"), Some(false));

    let robot = evaluate("This uses a Robot.", &set).unwrap();
    assert_eq!(robot.passed("no_excluded_words"), Some(false));

    let analogy = evaluate("It behaves like water", &set).unwrap();
    assert_eq!(analogy.passed("no_analogies"), Some(false));

    let likewise = evaluate("Likewise, it performs well", &set).unwrap();
    assert_eq!(likewise.passed("no_analogies"), Some(true));
    assert!(likewise.all_passed());
}
