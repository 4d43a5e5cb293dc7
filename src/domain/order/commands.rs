use super::value_objects::OrderItem;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    /// Swap the whole item list; the old items are discarded, never merged.
    ReplaceItems { items: Vec<OrderItem> },
    Approve,
    Reject,
    Cancel,
    Pay,
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::ReplaceItems { .. } => "replace_items",
            OrderCommand::Approve => "approve",
            OrderCommand::Reject => "reject",
            OrderCommand::Cancel => "cancel",
            OrderCommand::Pay => "pay",
        }
    }
}
