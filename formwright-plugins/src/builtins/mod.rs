//! Builtin specializations of generated plugin forms.

mod designer;
mod routes;
mod soap;
mod tunnel;

use crate::registry::TransformRegistry;

pub use routes::{target_summary, BACKEND_FLOW, FRONTEND_FLOW, HOSTNAME_BLACKLIST_MESSAGE};

pub const GRAPHQL_BACKEND: &str = "cp:otoroshi.next.plugins.GraphQLBackend";
pub const MOCK_RESPONSES: &str = "cp:otoroshi.next.plugins.MockResponses";
pub const TUNNEL: &str = "cp:otoroshi.next.tunnel.TunnelPlugin";
pub const SOAP_ACTION: &str = "cp:otoroshi.next.plugins.SOAPAction";
pub const SOAP_ACTION_CONFIG: &str = "cp:otoroshi.next.plugins.SOAPActionConfig";
/// Route node ids, specialized like plugins.
pub const FRONTEND: &str = "Frontend";
pub const BACKEND: &str = "Backend";

pub(crate) fn register_all(registry: &mut TransformRegistry) {
    registry.register(GRAPHQL_BACKEND, designer::graphql_backend);
    registry.register(MOCK_RESPONSES, designer::mock_responses);
    registry.register(TUNNEL, tunnel::tunnel);
    registry.register(SOAP_ACTION, soap::soap_envelope);
    registry.register(SOAP_ACTION_CONFIG, soap::soap_envelope);
    registry.register(FRONTEND, routes::frontend);
    registry.register(BACKEND, routes::backend);
}
