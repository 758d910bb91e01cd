/// Customer Tool Calls
///
/// A `tools/call` request is first parsed into a [`ToolCall`] (all argument
/// checks happen here, before the store is touched) and then executed
/// against a [`CustomerStore`]. The returned JSON is the tool's payload;
/// the dispatcher wraps it in MCP content framing.

use serde_json::{Value, json};
use tracing::debug;

use super::ToolName;
use super::args::Arguments;
use crate::core::error::McpResult;
use crate::store::{CustomerStatus, CustomerStore, CustomerUpdate};

/// A fully parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    GetCustomer {
        customer_id: i64,
    },
    ListCustomers {
        status: Option<CustomerStatus>,
    },
    AddCustomer {
        name: String,
        email: Option<String>,
        phone: Option<String>,
    },
    UpdateCustomer {
        customer_id: i64,
        update: CustomerUpdate,
    },
    DisableCustomer {
        customer_id: i64,
    },
    ActivateCustomer {
        customer_id: i64,
    },
}

impl ToolCall {
    /// Validate `arguments` for `tool`.
    pub fn parse(tool: ToolName, arguments: Option<Value>) -> McpResult<Self> {
        let args = Arguments::new(tool, arguments)?;

        let call = match tool {
            ToolName::GetCustomer => ToolCall::GetCustomer {
                customer_id: args.customer_id()?,
            },
            ToolName::ListCustomers => ToolCall::ListCustomers {
                status: args.optional_status("status")?,
            },
            ToolName::AddCustomer => ToolCall::AddCustomer {
                name: args.required_string("name")?,
                email: args.optional_string("email")?,
                phone: args.optional_string("phone")?,
            },
            ToolName::UpdateCustomer => ToolCall::UpdateCustomer {
                customer_id: args.customer_id()?,
                update: CustomerUpdate {
                    name: args.patch_string("name")?,
                    email: args.patch_string("email")?,
                    phone: args.patch_string("phone")?,
                },
            },
            ToolName::DisableCustomer => ToolCall::DisableCustomer {
                customer_id: args.customer_id()?,
            },
            ToolName::ActivateCustomer => ToolCall::ActivateCustomer {
                customer_id: args.customer_id()?,
            },
        };

        Ok(call)
    }

    pub fn tool(&self) -> ToolName {
        match self {
            ToolCall::GetCustomer { .. } => ToolName::GetCustomer,
            ToolCall::ListCustomers { .. } => ToolName::ListCustomers,
            ToolCall::AddCustomer { .. } => ToolName::AddCustomer,
            ToolCall::UpdateCustomer { .. } => ToolName::UpdateCustomer,
            ToolCall::DisableCustomer { .. } => ToolName::DisableCustomer,
            ToolCall::ActivateCustomer { .. } => ToolName::ActivateCustomer,
        }
    }

    /// Run the call against the store and build its result payload.
    pub fn execute(self, store: &CustomerStore) -> McpResult<Value> {
        debug!(tool = %self.tool(), "Executing tool call");

        let payload = match self {
            ToolCall::GetCustomer { customer_id } => {
                let customer = store.get(customer_id)?;
                json!({ "success": true, "customer": customer })
            }
            ToolCall::ListCustomers { status } => {
                let customers = store.list(status)?;
                json!({
                    "success": true,
                    "count": customers.len(),
                    "customers": customers
                })
            }
            ToolCall::AddCustomer { name, email, phone } => {
                let customer = store.add(&name, email.as_deref(), phone.as_deref())?;
                json!({
                    "success": true,
                    "message": format!("Customer created with ID {}", customer.id),
                    "customer": customer
                })
            }
            ToolCall::UpdateCustomer {
                customer_id,
                update,
            } => {
                let customer = store.update(customer_id, update)?;
                json!({
                    "success": true,
                    "message": format!("Customer {} updated successfully", customer_id),
                    "customer": customer
                })
            }
            ToolCall::DisableCustomer { customer_id } => {
                let customer = store.disable(customer_id)?;
                json!({
                    "success": true,
                    "message": format!("Customer {} has been disabled", customer_id),
                    "customer": customer
                })
            }
            ToolCall::ActivateCustomer { customer_id } => {
                let customer = store.activate(customer_id)?;
                json!({
                    "success": true,
                    "message": format!("Customer {} has been activated", customer_id),
                    "customer": customer
                })
            }
        };

        Ok(payload)
    }
}
