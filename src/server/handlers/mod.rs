pub mod comparisons;
pub mod connections;
pub mod distances;
pub mod estimates;
pub mod places;
pub mod profiles;
