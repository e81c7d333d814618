pub mod eq_props;
pub mod naive_map;
pub mod test_keys;
