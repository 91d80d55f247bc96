pub mod handle;
pub mod manager;
pub mod types;

pub use manager::TaskManager;
pub use types::{
    CancellableTask,
    CatalogLoadResult,
    TaskHandle,
    TaskResult,
};
