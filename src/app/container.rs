use std::sync::Arc;

use crate::adapters::{FfmpegAdapter, FfprobeAdapter};
use crate::app::{
    convert_interactor::ConvertInteractor, inspect_interactor::InspectInteractor,
    thumbnail_interactor::ThumbnailInteractor,
};
use crate::ports::{ProbePort, TransformPort};

pub trait AppContainer: Send + Sync {
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
    fn thumbnail_interactor(&self) -> Arc<ThumbnailInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    convert_interactor: Arc<ConvertInteractor>,
    thumbnail_interactor: Arc<ThumbnailInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    pub fn new() -> Self {
        let probe_port: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new());
        let transform_port: Arc<dyn TransformPort> = Arc::new(FfmpegAdapter::new());

        let convert_interactor = Arc::new(ConvertInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&transform_port),
        ));
        let thumbnail_interactor = Arc::new(ThumbnailInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&transform_port),
        ));
        let inspect_interactor = Arc::new(InspectInteractor::new(Arc::clone(&probe_port)));

        Self {
            convert_interactor,
            thumbnail_interactor,
            inspect_interactor,
        }
    }
}

impl Default for DefaultAppContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContainer for DefaultAppContainer {
    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }

    fn thumbnail_interactor(&self) -> Arc<ThumbnailInteractor> {
        Arc::clone(&self.thumbnail_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
