pub mod mock_push;
