use crate::{analysis::AnalysisError, readings::ReadingsError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `readings` module")]
    Readings(#[from] ReadingsError),
    #[error("Error in the `analysis` module")]
    Analysis(#[from] AnalysisError),
}
