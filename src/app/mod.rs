// Application layer - use case interactors

pub mod container;
pub mod convert_interactor;
pub mod inspect_interactor;
pub mod thumbnail_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use convert_interactor::{ConvertInteractor, ConvertRequest, ConvertResponse};
pub use inspect_interactor::{InspectInteractor, InspectRequest, InspectResponse};
pub use thumbnail_interactor::{ThumbnailInteractor, ThumbnailRequest, ThumbnailResponse};
