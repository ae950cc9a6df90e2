// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod directory;
pub mod forms;
pub mod ids;
pub mod list_editor;
pub mod model;
pub mod state;
pub mod transfer;

pub use directory::*;
pub use forms::*;
pub use ids::*;
pub use list_editor::*;
pub use model::*;
pub use state::*;
pub use transfer::*;
