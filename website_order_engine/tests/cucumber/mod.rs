mod steps;
mod world;

pub use world::{OrderSystem, WebsiteOrderWorld};
