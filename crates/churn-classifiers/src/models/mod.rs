pub mod baseline;
pub mod classifier_trait;
pub mod factory;
pub mod logistic;

pub use baseline::MajorityClassBaseline;
pub use classifier_trait::ClassifierModel;
pub use factory::{build_model, ModelKind};
pub use logistic::LogisticRegression;
