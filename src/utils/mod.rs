pub mod validation;

pub use validation::validate_vote_request;
