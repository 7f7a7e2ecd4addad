pub mod category;
pub mod model;
pub mod tags;
pub mod text;

pub use category::{infer_category, resolve_category, synonyms};
pub use model::{Category, Pricing, RawService, Service, ThinService};
