pub mod api_client;
pub mod data_factory;
pub mod lifecycle;
pub mod mock_router;
pub mod report;
pub mod retry;
pub mod schema_registry;

#[cfg(test)]
mod mock_router_test;
