// Copyright @yucwang 2021

pub mod error;
pub mod interaction;
pub mod rng;
pub mod scene;
pub mod settings;
