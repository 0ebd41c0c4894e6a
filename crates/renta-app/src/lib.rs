// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod form;
pub mod ids;
pub mod meta;
pub mod model;
pub mod nav;

pub use error::*;
pub use form::*;
pub use ids::*;
pub use model::*;
pub use nav::*;
