//! Knowledge-base corpus: feature stores, model registry and static knowledge

mod datasets;
mod feature_table;
mod fitness;
mod registry;

pub use datasets::{DatasetSource, DATASETS};
pub use feature_table::{FeatureTable, GroupKey, Record};
pub use fitness::{add_fitness_knowledge, FITNESS_KNOWLEDGE};
pub use registry::{add_model_info, load_registry, ModelEntry};
