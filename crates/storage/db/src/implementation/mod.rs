pub(crate) mod redb;
