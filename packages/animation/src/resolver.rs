use crate::props::{MotionProps, Target, Transition, Variants, Viewport};
use jsxlab_parser::{AnimationConfig, AnimationKind, AnimationTrigger};
use serde_json::Value;
use tracing::trace;

const DEFAULT_SLIDE_DISTANCE: f64 = 100.0;
const DEFAULT_BOUNCE_DISTANCE: f64 = 20.0;
const DEFAULT_ROTATE_ANGLE: f64 = 180.0;
const DEFAULT_SCALE_INTENSITY: f64 = 1.0;
const DEFAULT_PULSE_INTENSITY: f64 = 1.1;
const IN_VIEW_AMOUNT: f64 = 0.3;

/// Resolve an animation block into motion props. Pure and deterministic.
///
/// Trigger → hooks:
///
/// | trigger  | initial  | animate  | other                                   |
/// |----------|----------|----------|-----------------------------------------|
/// | load     | hidden   | visible  |                                         |
/// | hover    | visible  | visible  | `whileHover: "hover"`                   |
/// | click    | visible  | visible  | `whileTap: "tap"`                       |
/// | inView   | hidden   |          | `whileInView: "visible"`, amount 0.3    |
///
/// Unknown kinds resolve as `fade`, unknown triggers as `load`.
pub fn resolve(config: &AnimationConfig) -> MotionProps {
    let variants = variants_for(config);
    let transition = transition_for(config);

    let label = |s: &str| Some(s.to_string());
    let props = match &config.trigger {
        AnimationTrigger::Hover => MotionProps {
            initial: label("visible"),
            animate: label("visible"),
            while_hover: label("hover"),
            while_tap: None,
            while_in_view: None,
            viewport: None,
            variants,
            transition,
        },
        AnimationTrigger::Click => MotionProps {
            initial: label("visible"),
            animate: label("visible"),
            while_hover: None,
            while_tap: label("tap"),
            while_in_view: None,
            viewport: None,
            variants,
            transition,
        },
        AnimationTrigger::InView => MotionProps {
            initial: label("hidden"),
            animate: None,
            while_hover: None,
            while_tap: None,
            while_in_view: label("visible"),
            viewport: Some(Viewport {
                once: false,
                amount: IN_VIEW_AMOUNT,
            }),
            variants,
            transition,
        },
        AnimationTrigger::Load | AnimationTrigger::Other(_) => MotionProps {
            initial: label("hidden"),
            animate: label("visible"),
            while_hover: None,
            while_tap: None,
            while_in_view: None,
            viewport: None,
            variants,
            transition,
        },
    };

    trace!(kind = %config.kind, trigger = %config.trigger, "resolved animation");
    props
}

fn variants_for(config: &AnimationConfig) -> Variants {
    match &config.kind {
        AnimationKind::Fade | AnimationKind::Other(_) => Variants {
            hidden: target([("opacity", 0.0.into())]),
            visible: target([("opacity", 1.0.into())]),
            hover: target([("opacity", 0.7.into())]),
            tap: target([("opacity", 0.5.into())]),
        },
        AnimationKind::Slide => {
            let distance = config.distance.unwrap_or(DEFAULT_SLIDE_DISTANCE);
            let (axis, offset) = match config.direction.as_deref() {
                Some("right") => ("x", distance),
                Some("up") => ("y", -distance),
                Some("down") => ("y", distance),
                _ => ("x", -distance),
            };
            Variants {
                hidden: target([(axis, number(offset)), ("opacity", 0.0.into())]),
                visible: target([(axis, 0.0.into()), ("opacity", 1.0.into())]),
                hover: target([(axis, number(offset * 0.1))]),
                tap: target([(axis, number(offset * 0.05))]),
            }
        }
        AnimationKind::Scale => {
            let intensity = config.intensity.unwrap_or(DEFAULT_SCALE_INTENSITY);
            let from = if config.direction.as_deref() == Some("out") {
                intensity + 1.0
            } else {
                0.0
            };
            Variants {
                hidden: target([("scale", number(from))]),
                visible: target([("scale", 1.0.into())]),
                hover: target([("scale", number(1.0 + intensity * 0.1))]),
                tap: target([("scale", number(1.0 - intensity * 0.05))]),
            }
        }
        AnimationKind::Rotate => {
            let angle = config.angle.unwrap_or(DEFAULT_ROTATE_ANGLE);
            Variants {
                hidden: target([("rotate", number(-angle))]),
                visible: target([("rotate", 0.0.into())]),
                hover: target([("rotate", number(angle * 0.1))]),
                tap: target([("rotate", number(angle * 0.05))]),
            }
        }
        AnimationKind::Bounce => {
            let distance = config.distance.unwrap_or(DEFAULT_BOUNCE_DISTANCE);
            keyframed("y", 0.0, [0.0, -distance, 0.0])
        }
        AnimationKind::Pulse => {
            let intensity = config.intensity.unwrap_or(DEFAULT_PULSE_INTENSITY);
            keyframed("scale", 1.0, [1.0, intensity, 1.0])
        }
        AnimationKind::Flip => {
            let axis = match config.direction.as_deref() {
                Some("y") => "rotateY",
                _ => "rotateX",
            };
            keyframed(axis, 0.0, [0.0, 180.0, 360.0])
        }
    }
}

/// Oscillations: hover and tap replay the visible keyframes
fn keyframed(property: &str, rest: f64, frames: [f64; 3]) -> Variants {
    let keyframes = Value::Array(frames.iter().map(|f| number(*f)).collect());
    let visible = target([(property, keyframes)]);
    Variants {
        hidden: target([(property, number(rest))]),
        hover: visible.clone(),
        tap: visible.clone(),
        visible,
    }
}

fn transition_for(config: &AnimationConfig) -> Transition {
    let repeat = (!config.repeat.is_none()).then_some(config.repeat);
    let repeat_type = match (&config.kind, repeat) {
        (_, None) => None,
        (AnimationKind::Bounce | AnimationKind::Pulse | AnimationKind::Flip, _) => {
            Some("loop".to_string())
        }
        _ => Some("reverse".to_string()),
    };

    Transition {
        duration: config.duration,
        delay: config.delay,
        ease: config.ease.clone(),
        repeat,
        repeat_type,
    }
}

fn target<const N: usize>(entries: [(&str, Value); N]) -> Target {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Rounded to four places so `180 * 0.1` stays `18`
fn number(value: f64) -> Value {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    Value::from(if rounded == 0.0 { 0.0 } else { rounded })
}
