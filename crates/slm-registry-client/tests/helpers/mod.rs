pub mod mock_registry;
pub mod test_data;
