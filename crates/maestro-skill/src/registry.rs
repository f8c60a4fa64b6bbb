// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup of tool dispatchers by tool kind.

use std::collections::HashMap;
use std::sync::Arc;

use maestro_core::{ToolDispatcher, ToolKind};

/// Registry of dispatchers, one per tool kind.
pub struct ToolRegistry {
    dispatchers: HashMap<ToolKind, Arc<dyn ToolDispatcher>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            dispatchers: HashMap::new(),
        }
    }

    /// Registers a dispatcher, replacing any earlier one for the same kind.
    pub fn register(&mut self, kind: ToolKind, dispatcher: Arc<dyn ToolDispatcher>) {
        self.dispatchers.insert(kind, dispatcher);
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn ToolDispatcher>> {
        self.dispatchers.get(&kind).cloned()
    }

    /// Registered kinds in a stable order.
    pub fn kinds(&self) -> Vec<ToolKind> {
        let mut kinds: Vec<ToolKind> = self.dispatchers.keys().copied().collect();
        kinds.sort_by_key(|k| k.to_string());
        kinds
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use maestro_core::{Conversation, ToolInvocation, ToolResult, ToolSchema};
    use serde_json::json;

    struct NamedTool(&'static str);

    #[async_trait]
    impl ToolDispatcher for NamedTool {
        fn tool_name(&self) -> &str {
            self.0
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.0.to_string(),
                description: format!("{} tool", self.0),
                input_schema: json!({"type": "object"}),
            }
        }

        async fn invoke(&self, invocation: &ToolInvocation, _: &Conversation) -> ToolResult {
            ToolResult::success(&invocation.id, self.0)
        }
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(ToolKind::Bash).is_none());
        assert!(registry.kinds().is_empty());
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolKind::Mermaid, Arc::new(NamedTool("mermaid")));
        registry.register(ToolKind::Bash, Arc::new(NamedTool("bash")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(ToolKind::Bash).unwrap().tool_name(), "bash");
        assert_eq!(registry.kinds(), vec![ToolKind::Bash, ToolKind::Mermaid]);
    }

    #[test]
    fn kinds_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolKind::Mermaid, Arc::new(NamedTool("mermaid")));
        registry.register(ToolKind::Bash, Arc::new(NamedTool("bash")));
        registry.register(ToolKind::Database, Arc::new(NamedTool("database")));

        assert_eq!(
            registry.kinds(),
            vec![ToolKind::Bash, ToolKind::Database, ToolKind::Mermaid]
        );
    }

    #[test]
    fn re_register_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolKind::Bash, Arc::new(NamedTool("bash")));
        registry.register(ToolKind::Bash, Arc::new(NamedTool("shell")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(ToolKind::Bash).unwrap().tool_name(), "shell");
    }
}
