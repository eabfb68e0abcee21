pub mod agent;
pub mod mock_agent;
pub mod roles;
