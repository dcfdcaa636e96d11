/// Last observed availability of a (user, store, item) favorite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteStore {
    pub user_id: String,
    pub store_id: i64,
    pub item_id: i64,
    pub items_available: u32,
}

impl FavoriteStore {
    pub fn new(user_id: impl Into<String>, store_id: i64, item_id: i64, items_available: u32) -> Self {
        Self {
            user_id: user_id.into(),
            store_id,
            item_id,
            items_available,
        }
    }

    pub fn matches(&self, store_id: i64, item_id: i64) -> bool {
        self.store_id == store_id && self.item_id == item_id
    }

    /// Only an empty favorite can become newly available
    pub fn is_empty(&self) -> bool {
        self.items_available == 0
    }
}
