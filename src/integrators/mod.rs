// Copyright @yucwang 2026

pub mod compaction;
pub mod path;
pub mod scatter;
