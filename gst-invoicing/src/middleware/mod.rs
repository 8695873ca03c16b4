mod tenant;

pub use tenant::TenantContext;
