// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/health";
pub const OPENAPI: &str = "/api-docs/openapi.json";
pub const INVOKE: &str = "/invoke";

// Resource shapes understood by the dispatcher
pub const CSR: &str = "/csr";
pub const CSR_TICKET: &str = "/csr/{ticketID}";
pub const CSR_REP: &str = "/csr/{repID}";
pub const CSR_CUSTOMER: &str = "/csr/{customerID}";
