/// Database traits.
pub mod database;
/// Transaction database traits.
pub mod transaction;
