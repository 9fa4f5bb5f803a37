pub mod analyzers;
pub mod bills;
pub mod errors;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod report;
pub mod transaction;
