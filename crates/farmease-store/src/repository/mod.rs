//! # Repository Module
//!
//! Database repositories for the local store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore / SessionState            Local DataService                 │
//! │       │  storage().set("cart", ..)        │  products().stock_levels() │
//! │       ▼                                   ▼                             │
//! │  StorageRepository                   ProductRepository                 │
//! │  ├── get(key)                        ├── insert / get_by_id / delete   │
//! │  ├── set(key, value)                 ├── update / list_by_seller       │
//! │  └── remove(key)                     ├── list_by_category / search     │
//! │       │                              └── stock_levels / set_stock      │
//! │       ▼                                   ▼                             │
//! │  client_storage                      products                          │
//! │                                                                         │
//! │  Offline sign-up / sign-in           Footer form, seller feedback page │
//! │       ▼                                   ▼                             │
//! │  ProfileRepository                   FeedbackRepository                │
//! │  ├── create(email, user_type)        ├── insert(new)                   │
//! │  └── get_by_email / get_by_id        └── list(query, limit)            │
//! │       ▼                                   ▼                             │
//! │  profiles                            feedback                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`StorageRepository`](storage::StorageRepository) - Durable client key-value storage
//! - [`ProductRepository`](product::ProductRepository) - Local product catalog
//! - [`ProfileRepository`](profile::ProfileRepository) - Local accounts and their user type
//! - [`FeedbackRepository`](feedback::FeedbackRepository) - Customer ratings

pub mod feedback;
pub mod product;
pub mod profile;
pub mod storage;
