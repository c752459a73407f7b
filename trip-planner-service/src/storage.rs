use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::atomic::{AtomicU64, Ordering};
use trip_planner::{PlannerError, Result};

use crate::models::{Item, ItemCreate, ItemUpdate, Pagination, User, UserCreate, UserUpdate};

const ITEM_NOT_FOUND: &str = "Item not found";
const USER_NOT_FOUND: &str = "User not found";

/// Trait for storing and retrieving items
///
/// Lookups by id fail with [`PlannerError::NotFound`] when the item is absent.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list(&self, page: Pagination) -> Result<Vec<Item>>;
    async fn get(&self, id: u64) -> Result<Item>;
    async fn create(&self, item: ItemCreate) -> Result<Item>;
    async fn update(&self, id: u64, update: ItemUpdate) -> Result<Item>;
    async fn delete(&self, id: u64) -> Result<Item>;
}

/// Trait for storing and retrieving users
///
/// Implementations must reject a create or update that would give two users
/// the same email with [`PlannerError::Validation`], and fail lookups of an
/// absent id with [`PlannerError::NotFound`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self, page: Pagination) -> Result<Vec<User>>;
    async fn get(&self, id: u64) -> Result<User>;
    async fn create(&self, user: UserCreate) -> Result<User>;
    async fn update(&self, id: u64, update: UserUpdate) -> Result<User>;
    async fn delete(&self, id: u64) -> Result<User>;
}

/// Id-keyed records with a monotonically increasing id counter
struct Table<T> {
    rows: DashMap<u64, T>,
    next_id: AtomicU64,
    /// Message carried by `NotFound` for this table
    missing: &'static str,
}

impl<T: Clone> Table<T> {
    fn seeded(missing: &'static str, rows: impl IntoIterator<Item = (u64, T)>) -> Self {
        let map = DashMap::new();
        let mut max_id = 0;
        for (id, row) in rows {
            max_id = max_id.max(id);
            map.insert(id, row);
        }
        Self {
            rows: map,
            next_id: AtomicU64::new(max_id + 1),
            missing,
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn page(&self, page: Pagination) -> Vec<T> {
        let mut rows: Vec<(u64, T)> = self
            .rows
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter()
            .skip(page.skip)
            .take(page.limit)
            .map(|(_, row)| row)
            .collect()
    }

    fn not_found(&self) -> PlannerError {
        PlannerError::NotFound(self.missing.to_string())
    }

    fn get(&self, id: u64) -> Result<T> {
        self.rows
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| self.not_found())
    }

    fn remove(&self, id: u64) -> Result<T> {
        self.rows
            .remove(&id)
            .map(|(_, row)| row)
            .ok_or_else(|| self.not_found())
    }
}

/// In-memory implementation of ItemStore
pub struct InMemoryItemStore {
    table: Table<Item>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            table: Table::seeded(ITEM_NOT_FOUND, std::iter::empty()),
        }
    }

    /// Store pre-populated with the demo catalogue
    pub fn with_demo_data() -> Self {
        let items = [
            Item {
                id: 1,
                name: "Apple".to_string(),
                description: Some("A red apple".to_string()),
                price: 1.50,
            },
            Item {
                id: 2,
                name: "Banana".to_string(),
                description: Some("A yellow banana".to_string()),
                price: 0.75,
            },
        ];
        Self {
            table: Table::seeded(ITEM_NOT_FOUND, items.into_iter().map(|item| (item.id, item))),
        }
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list(&self, page: Pagination) -> Result<Vec<Item>> {
        Ok(self.table.page(page))
    }

    async fn get(&self, id: u64) -> Result<Item> {
        self.table.get(id)
    }

    async fn create(&self, item: ItemCreate) -> Result<Item> {
        let item = Item {
            id: self.table.allocate_id(),
            name: item.name,
            description: item.description,
            price: item.price,
        };
        self.table.rows.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: u64, update: ItemUpdate) -> Result<Item> {
        let mut entry = self
            .table
            .rows
            .get_mut(&id)
            .ok_or_else(|| self.table.not_found())?;
        entry.apply(update);
        Ok(entry.clone())
    }

    async fn delete(&self, id: u64) -> Result<Item> {
        self.table.remove(id)
    }
}

/// In-memory implementation of UserStore
///
/// Emails are reserved in a secondary index through `DashMap::entry`, so two
/// concurrent creates with the same address cannot both succeed.
pub struct InMemoryUserStore {
    table: Table<User>,
    emails: DashMap<String, u64>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            table: Table::seeded(USER_NOT_FOUND, std::iter::empty()),
            emails: DashMap::new(),
        }
    }

    /// Store pre-populated with the demo accounts
    pub fn with_demo_data() -> Self {
        let users = [
            User {
                id: 1,
                name: "John Doe".to_string(),
                email: "john@example.com".to_string(),
                is_active: true,
            },
            User {
                id: 2,
                name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                is_active: true,
            },
        ];
        let emails = users
            .iter()
            .map(|user| (user.email.clone(), user.id))
            .collect();
        Self {
            table: Table::seeded(USER_NOT_FOUND, users.into_iter().map(|user| (user.id, user))),
            emails,
        }
    }

    fn duplicate_email() -> PlannerError {
        PlannerError::Validation("Email already registered".to_string())
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self, page: Pagination) -> Result<Vec<User>> {
        Ok(self.table.page(page))
    }

    async fn get(&self, id: u64) -> Result<User> {
        self.table.get(id)
    }

    async fn create(&self, user: UserCreate) -> Result<User> {
        let id = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(Self::duplicate_email()),
            Entry::Vacant(slot) => {
                let id = self.table.allocate_id();
                slot.insert(id);
                id
            }
        };

        let user = User {
            id,
            name: user.name,
            email: user.email,
            is_active: true,
        };
        self.table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: u64, update: UserUpdate) -> Result<User> {
        // row lock is held until the email index agrees with the row
        let mut row = self
            .table
            .rows
            .get_mut(&id)
            .ok_or_else(|| self.table.not_found())?;

        if let Some(email) = update.email.as_ref().filter(|e| **e != row.email) {
            match self.emails.entry(email.clone()) {
                Entry::Occupied(_) => return Err(Self::duplicate_email()),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.emails.remove(&row.email);
        }

        row.apply(update);
        Ok(row.clone())
    }

    async fn delete(&self, id: u64) -> Result<User> {
        let removed = self.table.remove(id)?;
        self.emails.remove(&removed.email);
        Ok(removed)
    }
}
