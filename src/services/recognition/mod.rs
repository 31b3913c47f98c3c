pub mod classifier;
pub mod http_classifier;
pub mod model_server;
pub mod preprocess;

// Re-export main types
pub use classifier::AbilityClassifier;
pub use http_classifier::HttpClassifier;
pub use model_server::{ModelServerManager, ServerState};
pub use preprocess::{crop_region, encode_png, region_to_png, to_classifier_input};
