pub mod rest_remote_service;

pub use rest_remote_service::RestRemoteService;
