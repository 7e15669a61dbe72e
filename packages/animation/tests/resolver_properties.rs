use jsxlab_animation::resolve;
use jsxlab_parser::{AnimationConfig, AnimationKind, AnimationTrigger, Repeat};
use serde_json::json;

#[test]
fn test_unknown_type_behaves_as_fade() {
    for trigger in ["load", "hover", "click", "inView", "scroll"] {
        let unknown = AnimationConfig::new(AnimationKind::from("wobble"))
            .with_trigger(AnimationTrigger::from(trigger));
        let fade = AnimationConfig::new(AnimationKind::Fade).with_trigger(AnimationTrigger::from(trigger));

        assert_eq!(resolve(&unknown), resolve(&fade), "trigger {}", trigger);
    }
}

#[test]
fn test_unknown_trigger_behaves_as_load() {
    let unknown = AnimationConfig::default().with_trigger(AnimationTrigger::from("scroll"));
    let load = AnimationConfig::default();
    assert_eq!(resolve(&unknown), resolve(&load));
}

#[test]
fn test_slide_right_from_json_config() {
    let config: AnimationConfig = serde_json::from_str(
        r#"{ "type": "slide", "direction": "right", "distance": 50, "trigger": "load", "enabled": true }"#,
    )
    .unwrap();

    let props = resolve(&config);
    assert_eq!(
        serde_json::to_value(&props.variants.hidden).unwrap(),
        json!({ "x": 50.0, "opacity": 0.0 })
    );
    assert_eq!(
        serde_json::to_value(&props.variants.visible).unwrap(),
        json!({ "x": 0.0, "opacity": 1.0 })
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let config = AnimationConfig::new(AnimationKind::Rotate)
        .with_angle(90.0)
        .with_trigger(AnimationTrigger::Click);
    assert_eq!(resolve(&config), resolve(&config.clone()));
}

#[test]
fn test_jsx_props_rendering() {
    let config = AnimationConfig::new(AnimationKind::Bounce).with_repeat(Repeat::Infinite);
    let props = resolve(&config).jsx_props();
    let names: Vec<&str> = props.iter().map(|(n, _)| n.as_str()).collect();

    assert_eq!(names, vec!["initial", "animate", "variants", "transition"]);
    assert_eq!(props[0].1, "\"hidden\"");
    assert!(props[2].1.contains("visible: { y: [0, -20, 0] }"));
    assert_eq!(
        props[3].1,
        "{ duration: 0.5, delay: 0, ease: \"easeInOut\", repeat: Infinity, repeatType: \"loop\" }"
    );
}

#[test]
fn test_runtime_props_are_camel_case() {
    let config = AnimationConfig::default().with_trigger(AnimationTrigger::InView);
    let props = resolve(&config).runtime_props();

    assert_eq!(props["whileInView"], json!("visible"));
    assert_eq!(props["viewport"], json!({ "once": false, "amount": 0.3 }));
    assert!(!props.contains_key("animate"));
}
