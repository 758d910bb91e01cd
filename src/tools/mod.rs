/// Tools Module
///
/// The fixed set of customer-management tools. Tool names form a closed enum
/// so adding a tool means adding a variant, and every `match` over
/// [`ToolName`] (catalog, argument parsing, execution) must handle it.
///
/// - catalog.rs: static descriptors returned by `tools/list`
/// - args.rs: typed extraction of `tools/call` arguments
/// - customers.rs: parsed tool calls and their execution against the store

pub mod args;
pub mod catalog;
pub mod customers;

pub use catalog::ToolRegistry;
pub use customers::ToolCall;

/// Every tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetCustomer,
    ListCustomers,
    AddCustomer,
    UpdateCustomer,
    DisableCustomer,
    ActivateCustomer,
}

impl ToolName {
    /// All tools in catalog order
    pub const ALL: [ToolName; 6] = [
        ToolName::GetCustomer,
        ToolName::ListCustomers,
        ToolName::AddCustomer,
        ToolName::UpdateCustomer,
        ToolName::DisableCustomer,
        ToolName::ActivateCustomer,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetCustomer => "get_customer",
            ToolName::ListCustomers => "list_customers",
            ToolName::AddCustomer => "add_customer",
            ToolName::UpdateCustomer => "update_customer",
            ToolName::DisableCustomer => "disable_customer",
            ToolName::ActivateCustomer => "activate_customer",
        }
    }

    /// Argument names the tool accepts (required and optional)
    pub fn accepted_arguments(&self) -> &'static [&'static str] {
        match self {
            ToolName::GetCustomer | ToolName::DisableCustomer | ToolName::ActivateCustomer => {
                &["customer_id"]
            }
            ToolName::ListCustomers => &["status"],
            ToolName::AddCustomer => &["name", "email", "phone"],
            ToolName::UpdateCustomer => &["customer_id", "name", "email", "phone"],
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
