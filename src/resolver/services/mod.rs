pub mod base_url_services;
pub mod bootstrap_services;
pub mod handshake_services;
pub mod page_chain_services;
pub mod stream_resolver_services;

pub use base_url_services::DynBaseUrlService;
pub use handshake_services::DynHandshakeService;
pub use page_chain_services::DynPageChainService;
pub use stream_resolver_services::DynStreamResolverService;
