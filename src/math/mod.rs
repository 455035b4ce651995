pub mod fixed_point;
pub mod tick_math;
pub mod spacing;
pub mod clmm_swap;
