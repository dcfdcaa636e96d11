/// Fallback display name for items without one
pub const DEFAULT_ITEM_NAME: &str = "item(s)";

/// Raw pickup window as returned by the marketplace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupInterval {
    pub start: String,
    pub end: String,
}

/// One store/item availability observation from a single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub store_id: i64,
    pub store_name: String,
    pub branch: String,
    pub item_id: i64,
    pub item_name: String,
    pub items_available: u32,
    pub pickup_interval: Option<PickupInterval>,
}

impl StoreSnapshot {
    #[cfg(test)]
    pub fn new(store_id: i64, store_name: impl Into<String>, item_id: i64) -> Self {
        Self {
            store_id,
            store_name: store_name.into(),
            branch: String::new(),
            item_id,
            item_name: DEFAULT_ITEM_NAME.to_string(),
            items_available: 0,
            pickup_interval: None,
        }
    }

    #[cfg(test)]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    #[cfg(test)]
    pub fn with_item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = name.into();
        self
    }

    #[cfg(test)]
    pub fn with_available(mut self, items_available: u32) -> Self {
        self.items_available = items_available;
        self
    }

    #[cfg(test)]
    pub fn with_pickup(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.pickup_interval = Some(PickupInterval {
            start: start.into(),
            end: end.into(),
        });
        self
    }
}
