// Copyright @yucwang 2026

pub mod renderer;
pub mod sequential;
pub mod wavefront;
