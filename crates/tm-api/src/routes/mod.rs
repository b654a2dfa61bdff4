//! # API Route Modules
//!
//! - `licenses` - imagery license CRUD (`/licenses`, `/licenses/{id}`).

pub mod licenses;
