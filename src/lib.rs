pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod fit;
pub mod render {
    pub mod loader;
    pub mod surface;
    pub mod text;
}
pub mod session;
pub mod speech;
pub mod volume;

pub use editor::{Control, Controls, Editor};
pub use error::Error;
pub use fit::{FitError, FitResult, PixelRect, fit};
