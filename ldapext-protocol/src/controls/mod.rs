//! Typed controls
//!
//! Each module holds one control family with its binary and JSON codec.
//!
//! | Control | OID |
//! |---------|-----|
//! | Simple paged results | 1.2.840.113556.1.4.319 |
//! | ManageDsaIT | 2.16.840.1.113730.3.4.2 |
//! | Authorization identity request / response | 2.16.840.1.113730.3.4.16 / .15 |
//! | Proxied authorization v2 | 2.16.840.1.113730.3.4.18 |
//! | Account usable request / response | 1.3.6.1.4.1.42.2.27.9.5.8 |
//! | Get backend set ID request / response | 1.3.6.1.4.1.30221.2.5.33 / .34 |
//! | Get recent login history request / response | 1.3.6.1.4.1.30221.2.5.61 / .62 |
//! | Intermediate client request | 1.3.6.1.4.1.30221.2.5.2 |
//! | Join request | 1.3.6.1.4.1.30221.2.5.9 |

pub mod account_usable;
pub mod authorization_identity;
pub mod backend_set_id;
pub mod intermediate_client;
pub mod join_request;
pub mod join_rule;
pub mod manage_dsa_it;
pub mod paged_results;
pub mod proxied_authorization;
pub mod recent_login_history;

pub use account_usable::{
    AccountUsability, AccountUsableRequestControl, AccountUsableResponseControl,
};
pub use authorization_identity::{
    AuthorizationIdentityRequestControl, AuthorizationIdentityResponseControl,
};
pub use backend_set_id::{GetBackendSetIdRequestControl, GetBackendSetIdResponseControl};
pub use intermediate_client::{IntermediateClientRequestControl, IntermediateClientRequestValue};
pub use join_request::{
    DereferencePolicy, JoinBaseDn, JoinRequestControl, JoinRequestValue, SearchScope,
};
pub use join_rule::{JoinRule, JoinRules};
pub use manage_dsa_it::ManageDsaItRequestControl;
pub use paged_results::SimplePagedResultsControl;
pub use proxied_authorization::ProxiedAuthorizationV2RequestControl;
pub use recent_login_history::{
    GetRecentLoginHistoryRequestControl, GetRecentLoginHistoryResponseControl,
    RecentLoginHistory, RecentLoginHistoryAttempt,
};
