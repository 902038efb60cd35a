// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod aqi;
pub mod catalog;
pub mod ids;
pub mod model;
pub mod orchestrator;
pub mod render;
pub mod state;
pub mod table;

pub use aqi::*;
pub use catalog::*;
pub use ids::*;
pub use model::*;
pub use orchestrator::*;
pub use render::*;
pub use state::*;
pub use table::*;
