pub mod config;
pub mod notes;
pub mod router;
pub mod state;
pub mod store;

pub mod request {
    pub use crate::notes::request::*;
}

pub mod response {
    pub use crate::notes::response::*;
    pub use crate::store::Note;
}
