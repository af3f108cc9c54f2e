//! Open Food Facts adapter for the leafscore catalog seam.

pub mod open_food_facts;
mod wire;

pub use open_food_facts::{ClientBuildError, OpenFoodFactsClient, DEFAULT_USER_AGENT};
