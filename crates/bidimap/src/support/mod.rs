pub(crate) mod avl_table;
pub(crate) mod chain_table;
pub(crate) mod hash_builder;
pub(crate) mod hash_table;
pub(crate) mod item_set;
