//! Maps declarative `AnimationConfig` blocks onto motion props: variant
//! targets plus the lifecycle hooks (`animate`, `whileHover`, …) that select
//! them.

pub mod props;
pub mod resolver;

pub use props::{
    is_animation_prop, motion_tag, MotionProps, Target, Transition, Variants, Viewport,
    ANIMATION_PROPS,
};
pub use resolver::resolve;
