pub mod import;
pub mod extraction;
pub mod normalize;
pub mod processor;
