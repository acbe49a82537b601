// Copyright @yucwang 2026

pub mod geom;
pub mod mesh;
pub mod triangle;
