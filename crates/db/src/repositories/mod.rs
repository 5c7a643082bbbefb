//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Mutations open their own
//! transaction and append their activity event before committing; helpers
//! that take a `&mut Transaction` are crate-private building blocks for
//! those mutations and for the undo engine.

pub mod activity_repo;
pub mod board_repo;
pub mod card_repo;
pub mod label_repo;
pub mod list_repo;

pub use activity_repo::ActivityRepo;
pub use board_repo::BoardRepo;
pub use card_repo::CardRepo;
pub use label_repo::LabelRepo;
pub use list_repo::ListRepo;
