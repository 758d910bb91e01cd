/// Tool Catalog
///
/// Static descriptors for the six customer tools. Built once at startup and
/// returned verbatim by `tools/list`; never mutated afterwards. The catalog
/// only describes arguments; validation happens when a call is parsed.

use serde_json::{Value, json};

use super::ToolName;
use crate::core::protocol::McpTool;

/// Registry of available MCP tools.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<McpTool>,
}

impl ToolRegistry {
    /// Build descriptors for every [`ToolName`].
    pub fn new() -> Self {
        Self {
            tools: ToolName::ALL.into_iter().map(descriptor).collect(),
        }
    }

    pub fn tools(&self) -> &[McpTool] {
        &self.tools
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn customer_id_property(action: &str) -> Value {
    json!({
        "type": "integer",
        "description": format!("The unique ID of the customer to {action}")
    })
}

/// Descriptor for one tool.
pub fn descriptor(tool: ToolName) -> McpTool {
    let (description, input_schema) = match tool {
        ToolName::GetCustomer => (
            "Retrieve a specific customer by their ID. Returns customer details including name, email, phone, and status.",
            json!({
                "type": "object",
                "properties": { "customer_id": customer_id_property("retrieve") },
                "required": ["customer_id"]
            }),
        ),
        ToolName::ListCustomers => (
            "List all customers in the database. Can optionally filter by status (active or disabled).",
            json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": ["active", "disabled"],
                        "description": "Optional filter by customer status"
                    }
                }
            }),
        ),
        ToolName::AddCustomer => (
            "Add a new customer to the database. Name is required, email and phone are optional.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Customer's full name (required)" },
                    "email": { "type": "string", "description": "Customer's email address (optional)" },
                    "phone": { "type": "string", "description": "Customer's phone number (optional)" }
                },
                "required": ["name"]
            }),
        ),
        ToolName::UpdateCustomer => (
            "Update an existing customer's information. Provide the customer ID and the fields to update; omitted fields are left unchanged.",
            json!({
                "type": "object",
                "properties": {
                    "customer_id": customer_id_property("update"),
                    "name": { "type": "string", "description": "New name (optional)" },
                    "email": { "type": ["string", "null"], "description": "New email (optional, null clears it)" },
                    "phone": { "type": ["string", "null"], "description": "New phone (optional, null clears it)" }
                },
                "required": ["customer_id"]
            }),
        ),
        ToolName::DisableCustomer => (
            "Disable a customer account by setting their status to 'disabled'.",
            json!({
                "type": "object",
                "properties": { "customer_id": customer_id_property("disable") },
                "required": ["customer_id"]
            }),
        ),
        ToolName::ActivateCustomer => (
            "Activate a customer account by setting their status to 'active'.",
            json!({
                "type": "object",
                "properties": { "customer_id": customer_id_property("activate") },
                "required": ["customer_id"]
            }),
        ),
    };

    McpTool {
        name: tool.as_str(),
        description,
        input_schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_all_tools_in_order() {
        let registry = ToolRegistry::new();
        assert_eq!(
            registry.names(),
            vec![
                "get_customer",
                "list_customers",
                "add_customer",
                "update_customer",
                "disable_customer",
                "activate_customer"
            ]
        );
    }

    // Schema properties must match what argument parsing accepts.
    #[test]
    fn test_schema_properties_match_accepted_arguments() {
        for tool in ToolName::ALL {
            let schema = descriptor(tool).input_schema;
            let mut properties: Vec<&str> = schema["properties"]
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            let mut accepted = tool.accepted_arguments().to_vec();
            properties.sort_unstable();
            accepted.sort_unstable();
            assert_eq!(properties, accepted, "schema mismatch for {tool}");
        }
    }

    #[test]
    fn test_required_arguments() {
        let required = |tool| descriptor(tool).input_schema.get("required").cloned();
        assert_eq!(required(ToolName::GetCustomer), Some(json!(["customer_id"])));
        assert_eq!(required(ToolName::AddCustomer), Some(json!(["name"])));
        assert_eq!(required(ToolName::ListCustomers), None);
    }
}
