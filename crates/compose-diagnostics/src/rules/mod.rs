//! Rule front-ends: one per detector, turning engine output into
//! diagnostics against configured thresholds.

pub mod complexity;
pub mod effect_complexity;
pub mod effect_density;
pub mod mutation_in_render;
pub mod state_pass_through;
pub mod unremembered_constant;
