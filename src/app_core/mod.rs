//! Sheet state, input types, event reducer and lifecycle helpers.

pub mod animation;
pub mod chrome;
pub mod custom;
pub mod input;
pub mod reducer;
pub mod state;
