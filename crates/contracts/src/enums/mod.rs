pub mod dataset_kind;

pub use dataset_kind::DatasetKind;
