mod address;
mod case;
mod ensemble;
mod parameter;

pub use address::{ResultAddress, ResultVectorKey};
pub use case::{MemoryCase, ParameterValue, SummaryCase, SummarySeries};
pub use ensemble::{CaseFilter, Ensemble};
pub use parameter::{
    EnsembleParameter, NO_VARIATION_EPSILON, ParameterKind, VARIATION_BIN_COUNT, VariationBin,
    classify_variation,
};
