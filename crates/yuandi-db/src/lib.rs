//! # yuandi-db: Database Layer for YUANDI Collection Management
//!
//! This crate provides database access for the YUANDI order and
//! inventory system. It uses SQLite for local storage with sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        YUANDI Data Flow                                 │
//! │                                                                         │
//! │  Route handler (order intake, refund, catalog, stock ops)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     yuandi-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ InventoryRepo │    │ ...          │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, order, inventory)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use yuandi_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/yuandi.db")).await?;
//!
//! // Catalog entry with generated SKU
//! let product = db.products().create(new_product).await?;
//!
//! // Receive stock, take an order, refund it
//! db.inventory().receive(&product.id, 20, None).await?;
//! let order = db.orders().create(new_order).await?;
//! db.orders().refund(&order.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::inventory::InventoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
