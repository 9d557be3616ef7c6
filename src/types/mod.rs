pub mod observation;
pub mod query;
