// Domain-layer modules and shared errors/models
pub mod models {
    pub use crate::models::*;
}

pub mod note {
    pub use crate::note::*;
}

pub mod errors {
    pub use crate::errors::*;
}
