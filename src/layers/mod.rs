pub mod basemap;
pub mod feature;
pub mod marker;

pub use basemap::{BasemapCatalog, BasemapComposer, BasemapLayerDescriptor};
pub use feature::{FeatureLayer, FeatureLayerLoader, FeatureShape};
pub use marker::{Marker, MarkerIcon, MarkerId, SelectHandler};
