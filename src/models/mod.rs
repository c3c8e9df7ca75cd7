pub mod optimization;
pub mod prediction;
pub mod system;
pub mod weather;
