//! HTML parsers for Yahoo! sports keiba pages.

pub mod denma;

pub use denma::{DenmaParser, RaceCard};
