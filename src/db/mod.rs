pub mod catalogue;

pub use catalogue::Catalogue;
pub use catalogue::CatalogueError;
