pub mod claims;
pub mod credits;
pub mod dashboard;
pub mod donors;
pub mod evidence;
pub mod initiatives;
pub mod locations;
pub mod metrics;
